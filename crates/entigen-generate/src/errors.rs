use thiserror::Error;

/// Errors emitted by the generation engine.
///
/// Script failures are fatal to the whole pass: later specs may depend on
/// entities already appended, so there is no well-defined mid-pass recovery.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("script failed for instance '{instance}' at {location}: {message} (script: `{script}`)")]
    Script {
        instance: String,
        location: String,
        script: String,
        message: String,
    },
    #[error(
        "condition for instance '{instance}' must evaluate to a boolean, found {found} (script: `{script}`)"
    )]
    NonBooleanCondition {
        instance: String,
        script: String,
        found: String,
    },
    #[error("binding error: {0}")]
    Binding(String),
    #[error(transparent)]
    Core(#[from] entigen_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
