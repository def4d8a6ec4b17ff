use std::fmt::Write;

use regtest_compare::{ComparisonResult, KeyComparison};

use crate::report::{CaseOutcome, CaseReport, ReportEntry};
use crate::verdict::Verdict;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Render the per-key table for passing cases as well.
    pub verbose: bool,
}

impl CaseReport {
    /// Plain-text report.
    ///
    /// After a connection failure only the failure message is rendered; the
    /// per-file entries would be meaningless without a reference source.
    pub fn render(&self, options: &RenderOptions) -> String {
        if !self.connection_ok {
            let message = self.connection_message.as_deref().unwrap_or("unknown error");
            return format!("Reference store connection failed: {message}\n");
        }

        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                ReportEntry::Message { text } => {
                    let _ = writeln!(out, "{text}");
                }
                ReportEntry::Case(case) => render_case(&mut out, case, options),
            }
        }

        let counts = self.counts();
        let _ = writeln!(
            out,
            "\n{} file(s): {} passed, {} failed, {} warned, {} errored",
            counts.total(),
            counts.pass,
            counts.fail,
            counts.warn,
            counts.error
        );

        if !self.missing_references.is_empty() {
            let _ = writeln!(out, "\nNo reference for the following files; add one with:");
            for missing in &self.missing_references {
                let _ = writeln!(
                    out,
                    "  regtest add-reference {} {}",
                    missing.filename, missing.method
                );
            }
        }
        out
    }
}

fn render_case(out: &mut String, case: &CaseOutcome, options: &RenderOptions) {
    let _ = write!(out, "{:<5} {} [{}]", case.verdict, case.filename, case.method);
    if let Some(reason) = &case.reason {
        let _ = write!(out, ": {reason}");
    }
    if let Some(comparison) = &case.comparison {
        let _ = write!(out, " (avg diff {:.2}%)", comparison.average_diff);
    }
    out.push('\n');

    if let Some(comparison) = &case.comparison {
        if options.verbose || case.verdict == Verdict::Fail {
            render_table(out, comparison);
        }
    }
}

/// Full per-key table: every reference key, sample details and drift.
fn render_table(out: &mut String, comparison: &ComparisonResult) {
    let mut rows = Vec::new();
    for entry in comparison.entries.iter().chain(comparison.drift.iter()) {
        collect_rows(&mut rows, entry);
    }
    if rows.is_empty() {
        return;
    }

    let key_width = rows.iter().map(|r| r[0].len()).max().unwrap_or(0).max(3);
    let expected_width = rows.iter().map(|r| r[1].len()).max().unwrap_or(0).max(8);
    let actual_width = rows.iter().map(|r| r[2].len()).max().unwrap_or(0).max(6);

    let _ = writeln!(
        out,
        "    {:<key_width$}  {:>expected_width$}  {:>actual_width$}  {:>8}  RESULT",
        "KEY", "EXPECTED", "ACTUAL", "DIFF%"
    );
    for [key, expected, actual, diff, result] in rows {
        let _ = writeln!(
            out,
            "    {key:<key_width$}  {expected:>expected_width$}  {actual:>actual_width$}  {diff:>8}  {result}"
        );
    }
}

fn collect_rows(rows: &mut Vec<[String; 5]>, entry: &KeyComparison) {
    let show = |v: &Option<regtest_core::MetricValue>| {
        v.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)
    };
    let diff = entry
        .percent_diff
        .map_or_else(|| "-".to_string(), |d| format!("{d:.2}"));
    let result = match &entry.reason {
        None => "ok".to_string(),
        Some(reason) => format!("FAIL {reason}"),
    };
    rows.push([entry.key.clone(), show(&entry.expected), show(&entry.actual), diff, result]);
    for detail in &entry.details {
        collect_rows(rows, detail);
    }
}

#[cfg(test)]
mod tests {
    use regtest_compare::compare;
    use regtest_core::MetricSet;

    use super::*;
    use crate::{CaseReporter, Outcome};

    fn metrics(width: f64, angle: f64) -> MetricSet {
        [("WIDTH", width), ("ANGLE", angle)].into_iter().collect()
    }

    #[test]
    fn failing_case_renders_full_table() {
        let mut reporter = CaseReporter::new();
        let comparison = compare(&metrics(100.0, 30.0), &metrics(120.0, 30.0), 5.0);
        reporter.record("beam_01.xml", "beam", Outcome::compared(comparison));
        let text = reporter.finish().render(&RenderOptions::default());

        assert!(text.contains("FAIL  beam_01.xml [beam]: 1 key(s) failed"));
        assert!(text.contains("WIDTH"));
        assert!(text.contains("20.00"));
        let angle_row = text.lines().find(|l| l.trim_start().starts_with("ANGLE"));
        assert!(angle_row.is_some_and(|row| row.trim_end().ends_with("ok")), "{text}");
        assert!(text.contains("1 file(s): 0 passed, 1 failed"));
    }

    #[test]
    fn passing_case_has_no_table_unless_verbose() {
        let mut reporter = CaseReporter::new();
        let comparison = compare(&metrics(100.0, 30.0), &metrics(104.0, 30.0), 5.0);
        reporter.record("beam_01.xml", "beam", Outcome::compared(comparison));
        let report = reporter.finish();

        let quiet = report.render(&RenderOptions::default());
        assert!(quiet.contains("PASS  beam_01.xml [beam] (avg diff 2.00%)"));
        assert!(!quiet.contains("KEY"));

        let verbose = report.render(&RenderOptions { verbose: true });
        assert!(verbose.contains("KEY"));
        assert!(verbose.contains("ANGLE"));
    }

    #[test]
    fn sample_details_are_listed_by_path() {
        let sample = |sensor: f64| -> MetricSet { [("Pos", 1.0), ("Sensor", sensor)].into_iter().collect() };
        let mut reference = MetricSet::new();
        reference.push_sample("SLOPE", sample(10.0)).unwrap();
        let mut actual = MetricSet::new();
        actual.push_sample("SLOPE", sample(20.0)).unwrap();

        let mut reporter = CaseReporter::new();
        reporter.record("a.xml", "beam", Outcome::compared(compare(&reference, &actual, 5.0)));
        let text = reporter.finish().render(&RenderOptions::default());
        assert!(text.contains("SLOPE[0].Sensor"));
        assert!(text.contains("SLOPE[0].Pos "));
    }

    #[test]
    fn missing_references_end_with_hints() {
        let mut reporter = CaseReporter::new();
        reporter.record_missing_reference("missing.xml", "beam");
        let text = reporter.finish().render(&RenderOptions::default());

        assert!(text.contains("WARN  missing.xml [beam]: reference not found"));
        assert!(text.trim_end().ends_with("regtest add-reference missing.xml beam"));
    }

    #[test]
    fn connection_failure_suppresses_everything_else() {
        let mut reporter = CaseReporter::new();
        reporter.connection_failed("no route to store");
        reporter.record("a.xml", "beam", Outcome::error("whatever"));
        reporter.record_missing_reference("b.xml", "beam");
        let text = reporter.finish().render(&RenderOptions { verbose: true });

        assert_eq!(text, "Reference store connection failed: no route to store\n");
    }
}
