//! Tolerance-based comparison of a reference [`MetricSet`](regtest_core::MetricSet)
//! against an actual one.

pub mod comparator;
pub mod result;

pub use comparator::{compare, percent_diff};
pub use result::{ComparisonResult, FailureReason, KeyComparison};
