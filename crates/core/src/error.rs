use thiserror::Error;

use crate::metrics::MetricSetError;

/// Failure taxonomy shared across the workspace.
///
/// Everything except [`RegtestError::Connection`] is scoped to a single file or a
/// single store operation; the orchestrator turns those into report entries.
#[derive(Error, Debug)]
pub enum RegtestError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("reference for '{filename}' under method '{method}' already exists")]
    DuplicateReference { method: String, filename: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl From<MetricSetError> for RegtestError {
    fn from(e: MetricSetError) -> Self {
        RegtestError::Schema(e.to_string())
    }
}

impl RegtestError {
    /// Only an unreachable store aborts a whole run.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, RegtestError::Connection(_))
    }
}
