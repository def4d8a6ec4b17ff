use tracing::{debug, error};

use regtest_compare::ComparisonResult;

use crate::report::{CaseOutcome, CaseReport, MissingReference, ReportEntry};
use crate::verdict::Verdict;

/// Reason recorded for files that have no golden reference.
pub const REFERENCE_NOT_FOUND: &str = "reference not found";

/// Verdict plus its optional detail payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub reason: Option<String>,
    pub comparison: Option<ComparisonResult>,
}

impl Outcome {
    /// PASS or FAIL, derived from the comparison's overall verdict.
    pub fn compared(comparison: ComparisonResult) -> Self {
        let (verdict, reason) = if comparison.overall_passed {
            (Verdict::Pass, None)
        } else {
            let failed = comparison.failure_count();
            (Verdict::Fail, Some(format!("{failed} key(s) failed")))
        };
        Self {
            verdict,
            reason,
            comparison: Some(comparison),
        }
    }

    pub fn warn(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Warn,
            reason: Some(reason.into()),
            comparison: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Error,
            reason: Some(reason.into()),
            comparison: None,
        }
    }
}

/// Accumulates the entries of one run.
///
/// A failed store connection is terminal: later `record` calls are still
/// accepted, but rendering the finished report yields only the connection
/// failure.
#[derive(Debug)]
pub struct CaseReporter {
    report: CaseReport,
}

impl Default for CaseReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseReporter {
    pub fn new() -> Self {
        Self {
            report: CaseReport {
                entries: Vec::new(),
                connection_ok: true,
                connection_message: None,
                missing_references: Vec::new(),
            },
        }
    }

    pub fn connection_ok(&self) -> bool {
        self.report.connection_ok
    }

    /// Note the store the run is using.
    pub fn connection_established(&mut self, store: &str) {
        if self.report.connection_ok {
            self.note(format!("Connected to {store}"));
        }
    }

    /// Enter the terminal connection-failed state. The first message wins.
    pub fn connection_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(%message, "reference store connection failed");
        if self.report.connection_ok {
            self.report.connection_ok = false;
            self.report.connection_message = Some(message);
        }
    }

    /// Free-text entry.
    pub fn note(&mut self, text: impl Into<String>) {
        self.report.entries.push(ReportEntry::Message { text: text.into() });
    }

    pub fn record(&mut self, filename: &str, method: &str, outcome: Outcome) {
        debug!(filename, method, verdict = %outcome.verdict, "case recorded");
        self.report.entries.push(ReportEntry::Case(CaseOutcome {
            filename: filename.to_string(),
            method: method.to_string(),
            verdict: outcome.verdict,
            reason: outcome.reason,
            comparison: outcome.comparison,
        }));
    }

    /// Record a WARN case for a file without reference and remember the pair
    /// for the closing hint.
    pub fn record_missing_reference(&mut self, filename: &str, method: &str) {
        self.record(filename, method, Outcome::warn(REFERENCE_NOT_FOUND));
        let missing = MissingReference {
            filename: filename.to_string(),
            method: method.to_string(),
        };
        if !self.report.missing_references.contains(&missing) {
            self.report.missing_references.push(missing);
        }
    }

    /// Start a new batch: drop cases, notes and missing references. The
    /// connection status is kept.
    pub fn reset(&mut self) {
        self.report.entries.clear();
        self.report.missing_references.clear();
    }

    pub fn finish(self) -> CaseReport {
        self.report
    }
}
