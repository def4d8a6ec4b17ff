use std::fmt;

use thiserror::Error;

use regtest_core::{MetricSetError, RegtestError};

/// Which parse pass failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentLevel {
    Outer,
    Embedded,
}

impl fmt::Display for DocumentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentLevel::Outer => f.write_str("document"),
            DocumentLevel::Embedded => f.write_str("embedded document"),
        }
    }
}

/// Errors produced by [`MetricExtractor`](crate::MetricExtractor). All of them are
/// scoped to the one document being extracted.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed XML in {level}: {message}")]
    Parse { level: DocumentLevel, message: String },

    #[error("{0}")]
    Schema(String),

    #[error("{0}")]
    Conversion(String),
}

impl From<MetricSetError> for ExtractError {
    fn from(e: MetricSetError) -> Self {
        ExtractError::Schema(e.to_string())
    }
}

impl From<ExtractError> for RegtestError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Parse { .. } => RegtestError::Parse(e.to_string()),
            ExtractError::Schema(msg) => RegtestError::Schema(msg),
            ExtractError::Conversion(msg) => RegtestError::Conversion(msg),
        }
    }
}
