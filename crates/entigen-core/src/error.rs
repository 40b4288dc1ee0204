use thiserror::Error;

/// Core error type shared across entigen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration document is malformed or missing required entries.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// A dotted field path could not be parsed.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    /// A field path step does not match the shape of the entity tree.
    #[error("incompatible path '{path}' at segment '{segment}': {reason}")]
    IncompatiblePath {
        path: String,
        segment: String,
        reason: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias for results returned by entigen crates.
pub type Result<T> = std::result::Result<T, Error>;
