use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use regtest_core::MetricSet;

use crate::error::StoreError;
use crate::layout::{validate_identity, validate_method};
use crate::record::{ReferenceRecord, ReferenceSummary};
use crate::ReferenceStore;

type Key = (String, String);

/// In-process store. Used by tests and dry runs; contents vanish on drop.
#[derive(Debug, Default)]
pub struct MemoryReferenceStore {
    records: Mutex<BTreeMap<Key, ReferenceRecord>>,
}

impl MemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, BTreeMap<Key, ReferenceRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Connection("in-memory store lock poisoned".into()))
    }
}

impl ReferenceStore for MemoryReferenceStore {
    fn describe(&self) -> String {
        "in-memory store".to_string()
    }

    fn get(&self, method: &str, filename: &str) -> Result<Option<ReferenceRecord>, StoreError> {
        validate_identity(method, filename)?;
        let key = (method.to_string(), filename.to_string());
        Ok(self.records()?.get(&key).cloned())
    }

    fn add(
        &self,
        method: &str,
        filename: &str,
        metrics: MetricSet,
        raw_document: String,
    ) -> Result<ReferenceRecord, StoreError> {
        validate_identity(method, filename)?;
        let mut records = self.records()?;
        match records.entry((method.to_string(), filename.to_string())) {
            Entry::Occupied(_) => Err(StoreError::Duplicate {
                method: method.to_string(),
                filename: filename.to_string(),
            }),
            Entry::Vacant(slot) => {
                let record = ReferenceRecord::new(method, filename, metrics, raw_document);
                Ok(slot.insert(record).clone())
            }
        }
    }

    fn list(&self, method: Option<&str>) -> Result<Vec<ReferenceSummary>, StoreError> {
        if let Some(m) = method {
            validate_method(m)?;
        }
        let records = self.records()?;
        Ok(records
            .values()
            .filter(|r| method.map_or(true, |m| r.method == m))
            .map(ReferenceRecord::summary)
            .collect())
    }

    fn remove(&self, method: &str, filename: &str) -> Result<bool, StoreError> {
        validate_identity(method, filename)?;
        let key = (method.to_string(), filename.to_string());
        Ok(self.records()?.remove(&key).is_some())
    }
}
