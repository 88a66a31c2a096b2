//! Error types for the compliance engine
//!
//! Bad component data never produces an error: missing prices and origins
//! surface as `null` in the report. Errors are reserved for malformed input
//! and infrastructure failures.

use thiserror::Error;

/// A single failed reference-data lookup. Degrades one field to "absent".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("{source_name} unavailable: {message}")]
    Unavailable {
        source_name: &'static str,
        message: String,
    },

    #[error("{source_name} lookup timed out")]
    Timeout { source_name: &'static str },

    #[error("{source_name} rejected lookup: {message}")]
    Rejected {
        source_name: &'static str,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid reference data: {0}")]
    ReferenceData(String),

    #[error("Reference sources unavailable: all {attempted} lookups failed")]
    SourcesUnavailable { attempted: usize },

    #[error("Resolution cancelled before the batch completed")]
    Cancelled,

    #[error("Resolution deadline of {0}ms exceeded")]
    DeadlineExceeded(u128),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Infrastructure failures a caller may retry. These are never
    /// compliance verdicts.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::SourcesUnavailable { .. }
                | EngineError::Cancelled
                | EngineError::DeadlineExceeded(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
