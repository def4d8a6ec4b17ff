use std::path::Path;

use tracing::{debug, info, warn};

use regtest_compare::compare;
use regtest_core::{MetricSet, RegtestError};
use regtest_extract::ExtractError;
use regtest_report::{CaseReport, CaseReporter, Outcome, Verdict};
use regtest_store::{ReferenceRecord, ReferenceStore, StoreError};

use crate::context::RunContext;

/// File name component of a path, or the input itself when it has none.
pub fn base_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Sequences the cases of one test run against one store connection.
///
/// Per-file failures become ERROR or WARN entries. A connection failure,
/// either at construction or on a later lookup, ends the run: remaining
/// cases are skipped and the report renders only the connection error.
pub struct Orchestrator<S> {
    context: RunContext,
    store: Option<S>,
    reporter: CaseReporter,
}

impl<S: ReferenceStore> Orchestrator<S> {
    /// Start a run with the outcome of connecting to the store.
    pub fn new(context: RunContext, store: Result<S, StoreError>) -> Self {
        let mut reporter = CaseReporter::new();
        let store = match store {
            Ok(store) => {
                reporter.connection_established(&store.describe());
                Some(store)
            }
            Err(e) => {
                reporter.connection_failed(e.to_string());
                None
            }
        };
        Self {
            context,
            store,
            reporter,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// True once the store connection is lost; further cases are skipped.
    pub fn is_aborted(&self) -> bool {
        self.store.is_none()
    }

    pub fn note(&mut self, text: impl Into<String>) {
        self.reporter.note(text);
    }

    /// Record a per-file failure that happened before a document could be
    /// read, e.g. an unreadable path.
    pub fn record_error(&mut self, name: &str, method: &str, reason: impl Into<String>) {
        let filename = base_name(name);
        let method = self.context.resolve_method(method).to_string();
        self.reporter.record(&filename, &method, Outcome::error(reason));
    }

    /// Test one XML document. `name` may be a path; only its base name is
    /// used as the reference identity.
    ///
    /// Returns `None` when the case was skipped after a connection failure.
    pub fn test_document(&mut self, name: &str, method: &str, xml: &str) -> Option<Verdict> {
        let extractor = self.context.extractor_for(method);
        self.run_case(name, method, || extractor.extract(xml))
    }

    /// Test metrics produced elsewhere, e.g. by a subject under test that
    /// does not emit XML.
    pub fn test_metrics(
        &mut self,
        name: &str,
        method: &str,
        actual: Result<MetricSet, ExtractError>,
    ) -> Option<Verdict> {
        self.run_case(name, method, move || actual)
    }

    fn run_case<F>(&mut self, name: &str, method: &str, actual: F) -> Option<Verdict>
    where
        F: FnOnce() -> Result<MetricSet, ExtractError>,
    {
        let filename = base_name(name);
        let method = self.context.resolve_method(method).to_string();
        let Some(store) = self.store.as_ref() else {
            debug!(%filename, %method, "skipped, store connection lost");
            return None;
        };

        let reference = match store.lookup(&method, &filename) {
            Ok(reference) => reference,
            Err(e) if e.is_connection() => {
                self.reporter.connection_failed(e.to_string());
                self.store = None;
                return None;
            }
            Err(e) => {
                warn!(%filename, %method, error = %e, "reference lookup failed");
                self.reporter.record(&filename, &method, Outcome::error(e.to_string()));
                return Some(Verdict::Error);
            }
        };

        let Some(reference) = reference else {
            warn!(%filename, %method, "no reference");
            self.reporter.record_missing_reference(&filename, &method);
            return Some(Verdict::Warn);
        };

        let outcome = match actual() {
            Ok(metrics) => Outcome::compared(compare(&reference, &metrics, self.context.tolerance_percent)),
            Err(e) => {
                let e = RegtestError::from(e);
                warn!(%filename, %method, error = %e, "extraction failed");
                Outcome::error(e.to_string())
            }
        };
        let verdict = outcome.verdict;
        info!(%filename, %method, %verdict, "case finished");
        self.reporter.record(&filename, &method, outcome);
        Some(verdict)
    }

    /// Start a new batch on the same connection.
    pub fn reset(&mut self) {
        self.reporter.reset();
    }

    pub fn finish(self) -> CaseReport {
        self.reporter.finish()
    }
}

/// Extract a document and store its metrics as the golden reference for
/// `(method, base name)`. Never overwrites an existing reference.
pub fn add_reference<S: ReferenceStore>(
    context: &RunContext,
    store: &S,
    name: &str,
    method: &str,
    xml: &str,
) -> Result<ReferenceRecord, RegtestError> {
    let filename = base_name(name);
    let method = context.resolve_method(method);
    let metrics = context.extractor_for(method).extract(xml)?;
    debug!(%filename, method, keys = metrics.len(), "metrics extracted for reference");
    Ok(store.add(method, &filename, metrics, xml.to_string())?)
}
