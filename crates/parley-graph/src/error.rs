//! Error types for the analysis pipeline.

use thiserror::Error;

/// Failures that abort an analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The export had no usable records after parsing.
    #[error("Nothing to analyze: the export contains no usable records")]
    EmptyInput,

    /// An internal graph invariant was broken. Indicates a bug.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Reasons a single raw record is skipped. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record {index}: missing sender id")]
    MissingSender { index: usize },

    #[error("record {index}: unparsable timestamp {value:?}")]
    InvalidTimestamp { index: usize, value: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
