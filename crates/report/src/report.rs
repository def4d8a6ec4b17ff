use serde::{Deserialize, Serialize};

use regtest_compare::ComparisonResult;

use crate::verdict::Verdict;

/// One verdict block in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub filename: String,
    pub method: String,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportEntry {
    Message { text: String },
    Case(CaseOutcome),
}

/// A `(filename, method)` pair tested without a golden reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReference {
    pub filename: String,
    pub method: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub pass: usize,
    pub fail: usize,
    pub warn: usize,
    pub error: usize,
}

impl VerdictCounts {
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.warn + self.error
    }

    fn bump(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pass => self.pass += 1,
            Verdict::Fail => self.fail += 1,
            Verdict::Warn => self.warn += 1,
            Verdict::Error => self.error += 1,
        }
    }
}

/// The finished report of one run.
///
/// Produced by [`CaseReporter::finish`](crate::CaseReporter::finish) and
/// read-only from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub(crate) entries: Vec<ReportEntry>,
    pub(crate) connection_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) connection_message: Option<String>,
    pub(crate) missing_references: Vec<MissingReference>,
}

impl CaseReport {
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn connection_ok(&self) -> bool {
        self.connection_ok
    }

    /// Why the store connection failed, when it did.
    pub fn connection_message(&self) -> Option<&str> {
        self.connection_message.as_deref()
    }

    pub fn missing_references(&self) -> &[MissingReference] {
        &self.missing_references
    }

    pub fn cases(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Case(case) => Some(case),
            ReportEntry::Message { .. } => None,
        })
    }

    pub fn counts(&self) -> VerdictCounts {
        let mut counts = VerdictCounts::default();
        for case in self.cases() {
            counts.bump(case.verdict);
        }
        counts
    }

    /// True when the store was reachable, at least one file was processed and
    /// every processed file passed. Drives the process exit code.
    pub fn all_passed(&self) -> bool {
        self.connection_ok
            && self.cases().next().is_some()
            && self.cases().all(|case| case.verdict.is_pass())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
