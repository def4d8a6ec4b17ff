//! Per-run case report: verdict accumulation, failure isolation and rendering.

pub mod render;
pub mod report;
pub mod reporter;
pub mod sink;
pub mod verdict;

pub use render::RenderOptions;
pub use report::{CaseOutcome, CaseReport, MissingReference, ReportEntry, VerdictCounts};
pub use reporter::{CaseReporter, Outcome};
pub use sink::{FileSink, ReportSink, WriterSink};
pub use verdict::Verdict;
