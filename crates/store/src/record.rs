use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use regtest_core::MetricSet;

/// A stored golden reference. Identity is `(method, filename)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub method: String,
    pub filename: String,
    pub metrics: MetricSet,
    /// The document the metrics were extracted from, verbatim.
    pub raw_document: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReferenceRecord {
    pub fn new(method: &str, filename: &str, metrics: MetricSet, raw_document: String) -> Self {
        let now = Utc::now();
        Self {
            method: method.to_string(),
            filename: filename.to_string(),
            metrics,
            raw_document,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> ReferenceSummary {
        ReferenceSummary {
            filename: self.filename.clone(),
            method: self.method.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Inventory line returned by `list`; deserialisable straight from a stored record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceSummary {
    pub method: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
