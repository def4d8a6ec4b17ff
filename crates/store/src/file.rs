use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use regtest_core::config::StoreConfig;
use regtest_core::MetricSet;

use crate::error::StoreError;
use crate::layout::{record_file_name, validate_identity, validate_method};
use crate::record::{ReferenceRecord, ReferenceSummary};
use crate::ReferenceStore;

/// Filesystem-backed reference store.
///
/// Layout under the root:
/// ```text
/// references/
///   beam/                 <- one directory per method
///     beam_01.xml.json    <- one record per filename
///   lineSquareTube/
///     ...
/// ```
/// Records are written to a temp file and published with `hard_link`, which
/// fails atomically when the target exists. Concurrent `add` calls for one
/// identity therefore produce exactly one success, and readers never see a
/// partially written record.
#[derive(Debug)]
pub struct FileReferenceStore {
    root: PathBuf,
}

impl FileReferenceStore {
    /// Connect to the store described by `config`.
    ///
    /// The root is probed on a worker thread; a probe that fails or outlives
    /// `connect_timeout` yields [`StoreError::Connection`].
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let root = config.data_dir.clone();
        let create = config.create_if_missing;
        let (tx, rx) = mpsc::channel();

        let probe_root = root.clone();
        thread::Builder::new()
            .name("regtest-store-probe".into())
            .spawn(move || {
                tx.send(probe(&probe_root, create)).ok();
            })
            .map_err(|e| StoreError::Connection(format!("cannot start store probe: {e}")))?;

        match rx.recv_timeout(config.connect_timeout) {
            Ok(Ok(())) => {
                info!(root = %root.display(), "reference store connected");
                Ok(Self { root })
            }
            Ok(Err(e)) => Err(StoreError::Connection(format!("{}: {e}", root.display()))),
            Err(RecvTimeoutError::Timeout) => Err(StoreError::Connection(format!(
                "{} did not respond within {:?}",
                root.display(),
                config.connect_timeout
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::Connection(format!(
                "{}: probe exited without a result",
                root.display()
            ))),
        }
    }

    /// Base path for this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn method_dir(&self, method: &str) -> PathBuf {
        self.root.join(method)
    }

    fn record_path(&self, method: &str, filename: &str) -> PathBuf {
        self.method_dir(method).join(record_file_name(filename))
    }

    fn read_summaries(&self, dir: &Path, depth: usize) -> Result<Vec<ReferenceSummary>, StoreError> {
        let mut out = Vec::new();
        for entry in WalkDir::new(dir).min_depth(depth).max_depth(depth) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) => continue,
                Err(e) => return Err(StoreError::Io(e.into())),
            };
            let name = entry.file_name().to_string_lossy();
            if !entry.file_type().is_file() || name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }
            let content = fs::read_to_string(entry.path())?;
            match serde_json::from_str::<ReferenceSummary>(&content) {
                Ok(summary) => out.push(summary),
                Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping unreadable reference"),
            }
        }
        out.sort();
        Ok(out)
    }
}

/// Make sure the root exists (optionally creating it) and is a readable directory.
fn probe(root: &Path, create: bool) -> io::Result<()> {
    if create {
        fs::create_dir_all(root)?;
    }
    let meta = fs::metadata(root)?;
    if !meta.is_dir() {
        return Err(io::Error::new(io::ErrorKind::Other, "not a directory"));
    }
    fs::read_dir(root)?;
    Ok(())
}

impl ReferenceStore for FileReferenceStore {
    fn describe(&self) -> String {
        format!("file store at {}", self.root.display())
    }

    fn get(&self, method: &str, filename: &str) -> Result<Option<ReferenceRecord>, StoreError> {
        validate_identity(method, filename)?;
        let path = self.record_path(method, filename);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(method, filename, "no reference on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn add(
        &self,
        method: &str,
        filename: &str,
        metrics: MetricSet,
        raw_document: String,
    ) -> Result<ReferenceRecord, StoreError> {
        validate_identity(method, filename)?;
        let dir = self.method_dir(method);
        fs::create_dir_all(&dir)?;

        let record = ReferenceRecord::new(method, filename, metrics, raw_document);
        let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let written = write_synced(&tmp, &serde_json::to_vec_pretty(&record)?);
        let published = written.and_then(|()| fs::hard_link(&tmp, self.record_path(method, filename)));
        fs::remove_file(&tmp).ok();

        match published {
            Ok(()) => {
                info!(method, filename, "reference added");
                Ok(record)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(StoreError::Duplicate {
                method: method.to_string(),
                filename: filename.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, method: Option<&str>) -> Result<Vec<ReferenceSummary>, StoreError> {
        match method {
            Some(m) => {
                validate_method(m)?;
                self.read_summaries(&self.method_dir(m), 1)
            }
            None => self.read_summaries(&self.root, 2),
        }
    }

    fn remove(&self, method: &str, filename: &str) -> Result<bool, StoreError> {
        validate_identity(method, filename)?;
        match fs::remove_file(self.record_path(method, filename)) {
            Ok(()) => {
                info!(method, filename, "reference removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
