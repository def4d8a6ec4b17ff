use std::fmt;

use serde::{Deserialize, Serialize};

use regtest_core::MetricValue;

/// Why a single key failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Present in the reference, absent from the actual output.
    Missing,
    OutOfTolerance,
    /// Reference is exactly zero and actual is not; no finite percentage exists.
    ZeroReference,
    ValueMismatch,
    TypeMismatch { expected: String, actual: String },
    LengthMismatch { expected: usize, actual: usize },
    /// Sample lists of equal length where some element fields failed.
    ElementMismatch { failed: usize },
    /// Present in the actual output only (schema drift).
    Drift,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Missing => f.write_str("missing"),
            FailureReason::OutOfTolerance => f.write_str("outside tolerance"),
            FailureReason::ZeroReference => f.write_str("reference is zero, actual is not"),
            FailureReason::ValueMismatch => f.write_str("values differ"),
            FailureReason::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch ({expected} vs {actual})")
            }
            FailureReason::LengthMismatch { expected, actual } => {
                write!(f, "sample count {actual}, expected {expected}")
            }
            FailureReason::ElementMismatch { failed } => {
                write!(f, "{failed} sample field(s) failed")
            }
            FailureReason::Drift => f.write_str("not in reference"),
        }
    }
}

/// Verdict for one metric key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyComparison {
    pub key: String,
    pub expected: Option<MetricValue>,
    pub actual: Option<MetricValue>,
    /// `None` when no percentage applies (text, samples, missing, zero reference).
    pub percent_diff: Option<f64>,
    pub passed: bool,
    pub reason: Option<FailureReason>,
    /// Element-level comparisons of a sample list, keyed `SLOPE[0].Pos`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<KeyComparison>,
}

impl KeyComparison {
    pub(crate) fn pass(key: String, expected: &MetricValue, actual: &MetricValue, diff: Option<f64>) -> Self {
        Self {
            key,
            expected: Some(expected.clone()),
            actual: Some(actual.clone()),
            percent_diff: diff,
            passed: true,
            reason: None,
            details: Vec::new(),
        }
    }

    pub(crate) fn fail(
        key: String,
        expected: Option<&MetricValue>,
        actual: Option<&MetricValue>,
        diff: Option<f64>,
        reason: FailureReason,
    ) -> Self {
        Self {
            key,
            expected: expected.cloned(),
            actual: actual.cloned(),
            percent_diff: diff,
            passed: false,
            reason: Some(reason),
            details: Vec::new(),
        }
    }

    /// Contribution to the average difference, or `None` when the key is
    /// excluded from the denominator.
    pub(crate) fn average_weight(&self) -> Option<f64> {
        match (&self.reason, self.percent_diff) {
            (Some(FailureReason::Missing | FailureReason::ZeroReference | FailureReason::Drift), _) => {
                None
            }
            (_, Some(diff)) => Some(diff),
            (None, None) => Some(0.0),
            (Some(_), None) => Some(100.0),
        }
    }
}

/// Outcome of comparing an actual [`MetricSet`](regtest_core::MetricSet) with its reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub tolerance_percent: f64,
    /// One entry per reference key, in reference order.
    pub entries: Vec<KeyComparison>,
    /// Keys found only in the actual output; each is a failure.
    pub drift: Vec<KeyComparison>,
    pub overall_passed: bool,
    /// Mean percent difference over averaged keys (see [`KeyComparison`]).
    pub average_diff: f64,
}

impl ComparisonResult {
    pub fn get(&self, key: &str) -> Option<&KeyComparison> {
        self.entries
            .iter()
            .chain(self.drift.iter())
            .find(|c| c.key == key)
    }

    /// Every failed key, drift included.
    pub fn failures(&self) -> impl Iterator<Item = &KeyComparison> {
        self.entries
            .iter()
            .chain(self.drift.iter())
            .filter(|c| !c.passed)
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}
