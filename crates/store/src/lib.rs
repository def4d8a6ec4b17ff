//! Golden reference persistence.
//!
//! References are keyed by `(method, filename)` and immutable once written:
//! [`ReferenceStore::add`] is an atomic insert-if-absent and never overwrites.
//! Correcting a reference is an explicit [`ReferenceStore::remove`] followed
//! by a new `add`, performed by an operator.

pub mod error;
pub mod file;
mod layout;
pub mod memory;
pub mod record;

pub use error::StoreError;
pub use file::FileReferenceStore;
pub use memory::MemoryReferenceStore;
pub use record::{ReferenceRecord, ReferenceSummary};

use regtest_core::MetricSet;

/// Key-value(document) persistence of golden metric sets.
pub trait ReferenceStore {
    /// Human-readable location, used in connection messages.
    fn describe(&self) -> String;

    /// Full record for an identity, or `None` when no reference exists yet.
    fn get(&self, method: &str, filename: &str) -> Result<Option<ReferenceRecord>, StoreError>;

    /// Insert a new reference. Fails with [`StoreError::Duplicate`] when the
    /// identity is already present; the existing record is left untouched.
    fn add(
        &self,
        method: &str,
        filename: &str,
        metrics: MetricSet,
        raw_document: String,
    ) -> Result<ReferenceRecord, StoreError>;

    /// Inventory sorted by `(method, filename)`, optionally for one method.
    fn list(&self, method: Option<&str>) -> Result<Vec<ReferenceSummary>, StoreError>;

    /// Operator correction path. Returns whether a record was deleted.
    fn remove(&self, method: &str, filename: &str) -> Result<bool, StoreError>;

    /// Reference metrics for an identity. Absence is a normal outcome.
    fn lookup(&self, method: &str, filename: &str) -> Result<Option<MetricSet>, StoreError> {
        Ok(self.get(method, filename)?.map(|record| record.metrics))
    }
}
