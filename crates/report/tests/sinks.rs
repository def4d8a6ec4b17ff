use regtest_compare::compare;
use regtest_core::MetricSet;
use regtest_report::{
    CaseReport, CaseReporter, FileSink, Outcome, RenderOptions, ReportSink, Verdict, WriterSink,
};

fn sample_report() -> CaseReport {
    let reference: MetricSet = [("WIDTH", 100.0), ("ANGLE", 30.0)].into_iter().collect();
    let actual: MetricSet = [("WIDTH", 104.0), ("ANGLE", 30.0)].into_iter().collect();

    let mut reporter = CaseReporter::new();
    reporter.connection_established("in-memory store");
    reporter.record("beam_01.xml", "beam", Outcome::compared(compare(&reference, &actual, 5.0)));
    reporter.record("beam_02.xml", "beam", Outcome::error("parse error in outer document"));
    reporter.record_missing_reference("missing.xml", "beam");
    reporter.finish()
}

#[test]
fn writer_sink_receives_rendered_text() {
    let report = sample_report();
    let text = report.render(&RenderOptions::default());

    let mut sink = WriterSink::new(Vec::new());
    sink.emit(&text).unwrap();
    let written = String::from_utf8(sink.into_inner()).unwrap();

    assert_eq!(written, text);
    assert!(written.starts_with("Connected to in-memory store\n"));
    assert!(written.contains("ERROR beam_02.xml [beam]: parse error in outer document"));
    assert!(written.contains("3 file(s): 1 passed, 0 failed, 1 warned, 1 errored"));
}

#[test]
fn file_sink_creates_parent_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("reports/nightly/run.txt");

    let mut sink = FileSink::new(&path);
    sink.emit("report body\n").unwrap();
    sink.emit("second run\n").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second run\n");
}

#[test]
fn json_export_carries_verdicts_and_missing_references() {
    let report = sample_report();
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(value["connection_ok"], true);
    assert_eq!(value["entries"][0]["type"], "message");
    assert_eq!(value["entries"][1]["type"], "case");
    assert_eq!(value["entries"][1]["verdict"], "PASS");
    assert_eq!(value["entries"][1]["comparison"]["overall_passed"], true);
    assert_eq!(value["missing_references"][0]["filename"], "missing.xml");

    let back: CaseReport = serde_json::from_value(value).unwrap();
    assert_eq!(back.counts().pass, 1);
    assert_eq!(back.cases().last().map(|c| c.verdict), Some(Verdict::Warn));
}
