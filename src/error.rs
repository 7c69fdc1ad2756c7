// ⚠️ Error taxonomy
// Load failures are fatal, InsufficientData is reported, InvalidInput guards pure helpers

use thiserror::Error;

/// Every failure the core can surface to a caller.
///
/// An indeterminate t-test is NOT an error (see `change::Verdict`), and an
/// unmatched FAQ query is a normal answer.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A data row was malformed or a required value was missing.
    /// `line` is the 1-based data line (header excluded).
    #[error("Load error at line {line}: {message}")]
    Load { line: usize, message: String },

    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    InsufficientData(#[from] InsufficientData),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// The change flagger needs at least one day on each side of the split.
/// This is the only way `change::assess` can fail.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Insufficient data: {days} daily count(s), need at least 2")]
pub struct InsufficientData {
    pub days: usize,
}

pub type Result<T> = std::result::Result<T, ReportError>;
