use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::info;

/// Anything that accepts a rendered text report.
pub trait ReportSink {
    fn emit(&mut self, report: &str) -> io::Result<()>;
}

/// Writes the report to an [`io::Write`], e.g. stdout.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        self.writer.write_all(report.as_bytes())?;
        self.writer.flush()
    }
}

/// Writes the report to a file, replacing earlier content.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for FileSink {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, report)?;
        info!(path = %self.path.display(), "report written");
        Ok(())
    }
}
