use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pass count used when `numberToGenerate` is missing or malformed.
pub const DEFAULT_COUNT: u64 = 10;

/// Options for a generation session.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// RNG seed; a random seed is drawn when absent.
    pub seed: Option<u64>,
    /// Clock override for the date helpers; defaults to the local date.
    pub today: Option<NaiveDate>,
}

/// Counters accumulated over one generation session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub passes: u64,
    pub conditions_evaluated: u64,
    pub entities_generated: u64,
    pub specs_skipped: u64,
    pub scripts_compiled: u64,
}
