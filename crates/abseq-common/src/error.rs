//! Error types for abseq.
//!
//! Every failure carries:
//! - A stable numeric code for machine parsing
//! - A category for grouping
//! - A remediation hint for humans
//!
//! Validation warnings (odd parameter choices that still produce an answer)
//! are not errors and never flow through this type.

use crate::bucket::Arm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for abseq operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Parameter files and parameter values.
    Config,
    /// Caller contract violations in the data handed to the engine.
    Input,
    /// Inputs that make the statistic itself undefined.
    Numerical,
    /// File I/O and serialization.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for abseq.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {message}")]
    InvalidParameter { field: String, message: String },

    // Input contract violations (20-29)
    #[error("{arm} sequence is empty")]
    EmptySequence { arm: Arm },

    #[error("{arm} observation {index} is {value}, expected 0 or 1")]
    NonBinaryObservation { arm: Arm, index: usize, value: u8 },

    #[error("bucket {index}: success {success} exceeds engagement {engagement}")]
    SuccessExceedsEngagement {
        index: usize,
        success: u64,
        engagement: u64,
    },

    #[error("truncation point {truncation_point} outside 1..={available}")]
    TruncationOutOfRange {
        truncation_point: usize,
        available: usize,
    },

    #[error("malformed input: {0}")]
    Input(String),

    // Numerical errors (30-39)
    #[error("odds ratio {odds_ratio} leaves the critical bounds undefined")]
    DegenerateOddsRatio { odds_ratio: f64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input contract violations
    /// - 30-39: Numerical errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidParameter { .. } => 11,
            Error::EmptySequence { .. } => 20,
            Error::NonBinaryObservation { .. } => 21,
            Error::SuccessExceedsEngagement { .. } => 22,
            Error::TruncationOutOfRange { .. } => 23,
            Error::Input(_) => 24,
            Error::DegenerateOddsRatio { .. } => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidParameter { .. } => ErrorCategory::Config,

            Error::EmptySequence { .. }
            | Error::NonBinaryObservation { .. }
            | Error::SuccessExceedsEngagement { .. }
            | Error::TruncationOutOfRange { .. }
            | Error::Input(_) => ErrorCategory::Input,

            Error::DegenerateOddsRatio { .. } => ErrorCategory::Numerical,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Whether rerunning with the same inputs could succeed.
    ///
    /// The engine is deterministic, so only I/O failures qualify.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Check the parameter file syntax, or run 'abseq config show'.",
            Error::InvalidParameter { .. } => {
                "alpha and beta must lie in (0, 1); the odds ratio must be positive and finite."
            }
            Error::EmptySequence { .. } => {
                "Both arms need at least one observation. Check the bucket filter upstream."
            }
            Error::NonBinaryObservation { .. } => "Encode each trial as 0 (failure) or 1 (success).",
            Error::SuccessExceedsEngagement { .. } => {
                "A bucket reports more successes than trials. Fix the aggregation upstream."
            }
            Error::TruncationOutOfRange { .. } => {
                "Pick a truncation point between 1 and the shorter arm's length, or omit it."
            }
            Error::Input(_) => "Check the input file against the expected layout.",
            Error::DegenerateOddsRatio { .. } => {
                "Use an odds ratio different from 1; the test has no alternative to detect."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Invalid JSON in file. Check its syntax.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidParameter { .. } => "Invalid Test Parameter",
            Error::EmptySequence { .. } => "Empty Sequence",
            Error::NonBinaryObservation { .. } => "Non-Binary Observation",
            Error::SuccessExceedsEngagement { .. } => "Inconsistent Bucket",
            Error::TruncationOutOfRange { .. } => "Truncation Point Out Of Range",
            Error::Input(_) => "Malformed Input",
            Error::DegenerateOddsRatio { .. } => "Degenerate Odds Ratio",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }

    /// Structured form for JSON error payloads.
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            category: self.category(),
            message: self.to_string(),
            recoverable: self.is_recoverable(),
            remediation: self.remediation().to_string(),
        }
    }
}

/// Serializable error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    pub remediation: String,
}
