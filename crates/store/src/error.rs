use thiserror::Error;

use regtest_core::RegtestError;

/// Errors produced by [`ReferenceStore`](crate::ReferenceStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reference store unreachable: {0}")]
    Connection(String),

    #[error("reference for '{filename}' under method '{method}' already exists")]
    Duplicate { method: String, filename: String },

    #[error("invalid reference identity: {0}")]
    InvalidIdentity(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl From<StoreError> for RegtestError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Connection(msg) => RegtestError::Connection(msg),
            StoreError::Duplicate { method, filename } => {
                RegtestError::DuplicateReference { method, filename }
            }
            StoreError::InvalidIdentity(msg) => RegtestError::Schema(msg),
            StoreError::Io(e) => RegtestError::Io(e),
            StoreError::Json(e) => RegtestError::Serialize(e),
        }
    }
}
