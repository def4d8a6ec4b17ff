use regtest_core::{MetricSet, MetricValue};

use crate::result::{ComparisonResult, FailureReason, KeyComparison};

/// Percent difference of `actual` relative to `expected`.
///
/// Zero against zero is `Some(0.0)`; a non-zero value against a zero reference
/// has no finite percentage and yields `None`.
pub fn percent_diff(expected: f64, actual: f64) -> Option<f64> {
    if expected == 0.0 {
        return (actual == 0.0).then_some(0.0);
    }
    // Multiply before dividing so round inputs (e.g. 5 on 100) land exactly.
    let exact = (expected - actual).abs() * 100.0 / expected.abs();
    if exact.is_finite() {
        return Some(exact);
    }
    // Near f64::MAX the product overflows; scale both sides by the reference first.
    let scale = expected.abs();
    Some((expected / scale - actual / scale).abs() * 100.0)
}

/// Compare `actual` against `reference` under `tolerance_percent`.
///
/// Every reference key gets an entry; keys only present in `actual` are
/// recorded as drift and always fail. Pure and deterministic.
pub fn compare(reference: &MetricSet, actual: &MetricSet, tolerance_percent: f64) -> ComparisonResult {
    let (entries, drift) = compare_sets(reference, actual, tolerance_percent, "");

    let overall_passed = entries.iter().chain(drift.iter()).all(|c| c.passed);
    let weights: Vec<f64> = entries.iter().filter_map(KeyComparison::average_weight).collect();
    let average_diff = if weights.is_empty() {
        0.0
    } else {
        weights.iter().sum::<f64>() / weights.len() as f64
    };

    ComparisonResult {
        tolerance_percent,
        entries,
        drift,
        overall_passed,
        average_diff,
    }
}

fn compare_sets(
    reference: &MetricSet,
    actual: &MetricSet,
    tolerance: f64,
    prefix: &str,
) -> (Vec<KeyComparison>, Vec<KeyComparison>) {
    let entries = reference
        .iter()
        .map(|(key, expected)| {
            let path = format!("{prefix}{key}");
            match actual.get(key) {
                None => KeyComparison::fail(path, Some(expected), None, None, FailureReason::Missing),
                Some(found) => compare_values(path, expected, found, tolerance),
            }
        })
        .collect();

    let drift = actual
        .iter()
        .filter(|(key, _)| !reference.contains_key(key))
        .map(|(key, value)| {
            KeyComparison::fail(format!("{prefix}{key}"), None, Some(value), None, FailureReason::Drift)
        })
        .collect();

    (entries, drift)
}

fn compare_values(key: String, expected: &MetricValue, actual: &MetricValue, tolerance: f64) -> KeyComparison {
    match (expected, actual) {
        (MetricValue::Number(e), MetricValue::Number(a)) => match percent_diff(*e, *a) {
            Some(diff) if diff <= tolerance => KeyComparison::pass(key, expected, actual, Some(diff)),
            Some(diff) => KeyComparison::fail(
                key,
                Some(expected),
                Some(actual),
                Some(diff),
                FailureReason::OutOfTolerance,
            ),
            None => KeyComparison::fail(key, Some(expected), Some(actual), None, FailureReason::ZeroReference),
        },
        (MetricValue::Text(e), MetricValue::Text(a)) => {
            if e == a {
                KeyComparison::pass(key, expected, actual, None)
            } else {
                KeyComparison::fail(key, Some(expected), Some(actual), None, FailureReason::ValueMismatch)
            }
        }
        (MetricValue::Samples(e), MetricValue::Samples(a)) => compare_samples(key, expected, actual, e, a, tolerance),
        _ => KeyComparison::fail(
            key,
            Some(expected),
            Some(actual),
            None,
            FailureReason::TypeMismatch {
                expected: expected.kind().to_string(),
                actual: actual.kind().to_string(),
            },
        ),
    }
}

fn compare_samples(
    key: String,
    expected: &MetricValue,
    actual: &MetricValue,
    reference_samples: &[MetricSet],
    actual_samples: &[MetricSet],
    tolerance: f64,
) -> KeyComparison {
    if reference_samples.len() != actual_samples.len() {
        return KeyComparison::fail(
            key,
            Some(expected),
            Some(actual),
            None,
            FailureReason::LengthMismatch {
                expected: reference_samples.len(),
                actual: actual_samples.len(),
            },
        );
    }

    let mut details = Vec::new();
    for (i, (e, a)) in reference_samples.iter().zip(actual_samples).enumerate() {
        let (entries, drift) = compare_sets(e, a, tolerance, &format!("{key}[{i}]."));
        details.extend(entries);
        details.extend(drift);
    }

    let failed = details.iter().filter(|d| !d.passed).count();
    let mut outcome = if failed == 0 {
        KeyComparison::pass(key, expected, actual, None)
    } else {
        KeyComparison::fail(
            key,
            Some(expected),
            Some(actual),
            None,
            FailureReason::ElementMismatch { failed },
        )
    };
    outcome.details = details;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, MetricValue)]) -> MetricSet {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    fn num(n: f64) -> MetricValue {
        MetricValue::Number(n)
    }

    fn slope(pos: f64, sensor: f64) -> MetricSet {
        set(&[("Pos", num(pos)), ("Sensor", num(sensor))])
    }

    #[test]
    fn percent_diff_zero_cases() {
        assert_eq!(percent_diff(0.0, 0.0), Some(0.0));
        assert_eq!(percent_diff(0.0, 1.0), None);
        assert_eq!(percent_diff(0.0, -1e-12), None);
    }

    #[test]
    fn percent_diff_is_relative_to_reference() {
        assert_eq!(percent_diff(100.0, 104.0), Some(4.0));
        assert_eq!(percent_diff(100.0, 96.0), Some(4.0));
        assert_eq!(percent_diff(50.0, 100.0), Some(100.0));
        assert_eq!(percent_diff(-200.0, -210.0), Some(5.0));
    }

    #[test]
    fn percent_diff_symmetric_under_negation() {
        for (e, a) in [(100.0, 104.0), (3.5, 2.25), (-7.0, 9.0), (0.001, 0.0015)] {
            assert_eq!(percent_diff(e, a), percent_diff(-e, -a));
        }
    }

    #[test]
    fn percent_diff_stays_finite_near_f64_max() {
        assert_eq!(percent_diff(1e308, 0.0), Some(100.0));
        assert_eq!(percent_diff(-1e308, 1e308), Some(200.0));
        assert_eq!(percent_diff(f64::MAX, f64::MAX), Some(0.0));

        let result = compare(&set(&[("X", num(1e308))]), &set(&[("X", num(0.0))]), 150.0);
        assert!(result.overall_passed);
        assert_eq!(result.average_diff, 100.0);
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let reference = set(&[("WIDTH", num(100.0))]);
        assert!(compare(&reference, &set(&[("WIDTH", num(105.0))]), 5.0).overall_passed);
        assert!(compare(&reference, &set(&[("WIDTH", num(95.0))]), 5.0).overall_passed);

        let result = compare(&reference, &set(&[("WIDTH", num(105.0001))]), 5.0);
        assert!(!result.overall_passed);
        assert_eq!(result.get("WIDTH").unwrap().reason, Some(FailureReason::OutOfTolerance));
    }

    #[test]
    fn width_within_tolerance_passes() {
        let reference = set(&[("WIDTH", num(100.0)), ("ANGLE", num(30.0))]);
        let actual = set(&[("WIDTH", num(104.0)), ("ANGLE", num(30.0))]);
        let result = compare(&reference, &actual, 5.0);

        assert!(result.overall_passed);
        assert_eq!(result.get("WIDTH").unwrap().percent_diff, Some(4.0));
        assert_eq!(result.get("ANGLE").unwrap().percent_diff, Some(0.0));
        assert_eq!(result.average_diff, 2.0);
    }

    #[test]
    fn width_outside_tolerance_fails() {
        let reference = set(&[("WIDTH", num(100.0)), ("ANGLE", num(30.0))]);
        let actual = set(&[("WIDTH", num(120.0)), ("ANGLE", num(30.0))]);
        let result = compare(&reference, &actual, 5.0);

        assert!(!result.overall_passed);
        let width = result.get("WIDTH").unwrap();
        assert!(!width.passed);
        assert_eq!(width.percent_diff, Some(20.0));
        assert!(result.get("ANGLE").unwrap().passed);
        assert_eq!(result.failure_count(), 1);
    }

    #[test]
    fn zero_reference() {
        let reference = set(&[("START", num(0.0))]);
        assert!(compare(&reference, &set(&[("START", num(0.0))]), 5.0).overall_passed);

        let result = compare(&reference, &set(&[("START", num(1.0))]), 1e9);
        assert!(!result.overall_passed);
        let start = result.get("START").unwrap();
        assert_eq!(start.percent_diff, None);
        assert_eq!(start.reason, Some(FailureReason::ZeroReference));
    }

    #[test]
    fn zero_reference_excluded_from_average() {
        let reference = set(&[("START", num(0.0)), ("WIDTH", num(100.0))]);
        let actual = set(&[("START", num(3.0)), ("WIDTH", num(102.0))]);
        let result = compare(&reference, &actual, 5.0);
        assert!(!result.overall_passed);
        assert_eq!(result.average_diff, 2.0);
    }

    #[test]
    fn missing_key_fails_without_diff() {
        let reference = set(&[("WIDTH", num(100.0)), ("ANGLE", num(30.0))]);
        let result = compare(&reference, &set(&[("WIDTH", num(100.0))]), 5.0);
        assert!(!result.overall_passed);
        let angle = result.get("ANGLE").unwrap();
        assert_eq!(angle.reason, Some(FailureReason::Missing));
        assert_eq!(angle.percent_diff, None);
        assert!(angle.actual.is_none());
    }

    #[test]
    fn extra_actual_key_is_drift() {
        let reference = set(&[("A", num(1.0)), ("B", num(2.0))]);
        let actual = set(&[("A", num(1.0)), ("B", num(2.0)), ("C", num(3.0))]);
        let result = compare(&reference, &actual, 5.0);

        assert!(!result.overall_passed);
        assert!(result.entries.iter().all(|c| c.passed));
        assert_eq!(result.drift.len(), 1);
        assert_eq!(result.drift[0].key, "C");
        assert_eq!(result.drift[0].reason, Some(FailureReason::Drift));
        assert_eq!(result.average_diff, 0.0);
    }

    #[test]
    fn text_requires_exact_equality() {
        let reference = set(&[("MATERIAL", "steel".into())]);
        assert!(compare(&reference, &set(&[("MATERIAL", "steel".into())]), 5.0).overall_passed);

        let result = compare(&reference, &set(&[("MATERIAL", "Steel".into())]), 100.0);
        assert!(!result.overall_passed);
        assert_eq!(result.average_diff, 100.0);
    }

    #[test]
    fn type_disagreement_fails() {
        let reference = set(&[("ANGLE", num(30.0))]);
        let result = compare(&reference, &set(&[("ANGLE", "30".into())]), 5.0);
        assert_eq!(
            result.get("ANGLE").unwrap().reason,
            Some(FailureReason::TypeMismatch {
                expected: "number".into(),
                actual: "text".into()
            })
        );
    }

    #[test]
    fn sample_length_mismatch_fails_key() {
        let reference = set(&[("SLOPE", vec![slope(1.0, 2.0), slope(2.0, 3.0)].into())]);
        let actual = set(&[("SLOPE", vec![slope(1.0, 2.0)].into())]);
        let result = compare(&reference, &actual, 5.0);
        let key = result.get("SLOPE").unwrap();
        assert!(!key.passed);
        assert_eq!(
            key.reason,
            Some(FailureReason::LengthMismatch { expected: 2, actual: 1 })
        );
        assert!(key.details.is_empty());
    }

    #[test]
    fn sample_elements_compared_with_same_rules() {
        let reference = set(&[("SLOPE", vec![slope(1.0, 2.0), slope(2.0, 3.0)].into())]);
        let actual = set(&[("SLOPE", vec![slope(1.02, 2.0), slope(2.0, 4.0)].into())]);
        let result = compare(&reference, &actual, 5.0);

        let key = result.get("SLOPE").unwrap();
        assert!(!key.passed);
        assert_eq!(key.reason, Some(FailureReason::ElementMismatch { failed: 1 }));
        let failed: Vec<&str> = key
            .details
            .iter()
            .filter(|d| !d.passed)
            .map(|d| d.key.as_str())
            .collect();
        assert_eq!(failed, vec!["SLOPE[1].Sensor"]);
        let first = key.details.iter().find(|d| d.key == "SLOPE[0].Pos").unwrap();
        assert!(first.passed);
    }

    #[test]
    fn identity_comparison_passes_at_zero_tolerance() {
        let metrics = set(&[
            ("START", num(0.0)),
            ("WIDTH", num(104.5)),
            ("ANGLE", num(-30.0)),
            ("LABEL", "beam".into()),
            ("SLOPE", vec![slope(1.0, 2.0), slope(0.0, 0.0)].into()),
        ]);
        let result = compare(&metrics, &metrics, 0.0);
        assert!(result.overall_passed);
        assert!(result.drift.is_empty());
        assert_eq!(result.average_diff, 0.0);
        assert!(result
            .entries
            .iter()
            .all(|c| c.percent_diff.unwrap_or(0.0) == 0.0));
    }

    #[test]
    fn entries_follow_reference_order() {
        let reference = set(&[("B", num(1.0)), ("A", num(1.0)), ("C", num(1.0))]);
        let actual = set(&[("C", num(1.0)), ("A", num(1.0)), ("B", num(1.0))]);
        let result = compare(&reference, &actual, 5.0);
        let keys: Vec<&str> = result.entries.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }
}
