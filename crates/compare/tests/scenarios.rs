//! Reference scenarios for beam outputs, end to end through `compare`.

use regtest_compare::{compare, FailureReason};
use regtest_core::{MetricSet, MetricValue};

fn beam(width: f64, angle: f64) -> MetricSet {
    [("WIDTH", width), ("ANGLE", angle)].into_iter().collect()
}

#[test]
fn four_percent_drift_in_width_passes_at_five() {
    let result = compare(&beam(100.0, 30.0), &beam(104.0, 30.0), 5.0);
    assert!(result.overall_passed);
    assert_eq!(result.failure_count(), 0);
}

#[test]
fn twenty_percent_drift_in_width_fails_at_five() {
    let result = compare(&beam(100.0, 30.0), &beam(120.0, 30.0), 5.0);
    assert!(!result.overall_passed);
    let failed: Vec<&str> = result.failures().map(|c| c.key.as_str()).collect();
    assert_eq!(failed, vec!["WIDTH"]);
}

#[test]
fn new_output_field_fails_even_when_known_fields_pass() {
    let reference = beam(100.0, 30.0);
    let mut actual = beam(100.0, 30.0);
    actual.insert("HEIGHT_MEAN", 5.0).unwrap();

    let result = compare(&reference, &actual, 5.0);
    assert!(!result.overall_passed);
    assert_eq!(result.drift[0].key, "HEIGHT_MEAN");
    assert_eq!(result.drift[0].actual, Some(MetricValue::Number(5.0)));
}

#[test]
fn result_serialises_with_reasons() {
    let result = compare(&beam(0.0, 30.0), &beam(2.0, 30.0), 5.0);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["overall_passed"], false);
    assert_eq!(json["entries"][0]["key"], "WIDTH");
    assert_eq!(json["entries"][0]["percent_diff"], serde_json::Value::Null);
    assert_eq!(json["entries"][0]["reason"]["kind"], "zero_reference");
    assert_eq!(json["entries"][1]["percent_diff"], 0.0);

    let back: regtest_compare::ComparisonResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.entries[0].reason, Some(FailureReason::ZeroReference));
}

#[test]
fn compare_is_deterministic() {
    let reference = beam(100.0, 30.0);
    let actual = beam(101.0, 29.0);
    assert_eq!(compare(&reference, &actual, 2.0), compare(&reference, &actual, 2.0));
}
