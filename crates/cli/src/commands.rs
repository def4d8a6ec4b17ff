use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use regtest_core::Config;
use regtest_extract::document_tree;
use regtest_report::{FileSink, RenderOptions, ReportSink, WriterSink};
use regtest_runner::{add_reference, Orchestrator, RunContext};
use regtest_store::{FileReferenceStore, ReferenceRecord, ReferenceStore};

use crate::cli::{CliArgs, Command};
use crate::config::CliConfig;

/// Effective settings for commands that touch the reference store.
struct Settings {
    config: Config,
    context: RunContext,
    verbose: bool,
}

impl Settings {
    /// Env (profiled) first, then CLI flag overrides, then the TOML profiles.
    fn resolve(args: &CliArgs) -> Result<Self> {
        let config = match &args.profile {
            Some(profile) => Config::from_lookup(profile, &|key| std::env::var(key).ok()),
            None => Config::from_env(),
        };
        let mut config = config.context("invalid environment configuration")?;
        if let Some(dir) = &args.data_dir {
            config.store.data_dir = dir.clone();
        }
        if let Some(tolerance) = args.tolerance {
            config.tolerance_percent = tolerance;
        }
        config.validate()?;
        config.log_summary();

        let context = CliConfig::load(args.config.as_deref())?.into_context(config.tolerance_percent)?;
        Ok(Self {
            config,
            context,
            verbose: args.verbose,
        })
    }

    fn connect(&self) -> Result<FileReferenceStore> {
        Ok(FileReferenceStore::connect(&self.config.store)?)
    }
}

/// Run one command. `Ok(false)` means the command completed but did not
/// succeed (failed cases, rejected references) and maps to exit code 1.
pub fn run(args: CliArgs) -> Result<bool> {
    if let Command::Inspect { path } = &args.command {
        return inspect(path);
    }

    let settings = Settings::resolve(&args)?;
    match &args.command {
        Command::AddReference {
            path,
            method,
            batch,
        } => add_references(&settings, path, method, *batch),
        Command::List { method } => list(&settings, method.as_deref()),
        Command::Test {
            path,
            method,
            json,
            report,
        } => test(&settings, path, method, json.as_deref(), report.as_deref()),
        Command::RemoveReference { filename, method } => remove(&settings, filename, method),
        Command::Inspect { path } => inspect(path),
    }
}

fn add_references(settings: &Settings, path: &Path, method: &str, batch: bool) -> Result<bool> {
    let files = if path.is_dir() {
        if !batch {
            bail!("{} is a directory; pass --batch to add every *.xml file in it", path.display());
        }
        xml_files(path)?
    } else {
        vec![path.to_path_buf()]
    };
    if files.is_empty() {
        bail!("no *.xml files in {}", path.display());
    }

    let store = settings.connect()?;
    let (mut added, mut failed) = (0usize, 0usize);
    for file in &files {
        match add_one(&settings.context, &store, file, method) {
            Ok(record) => {
                added += 1;
                println!("Added reference {} [{}]", record.filename, record.method);
            }
            Err(e) => {
                failed += 1;
                warn!(file = %file.display(), error = %e, "reference not added");
                eprintln!("Failed to add {}: {e:#}", file.display());
            }
        }
    }
    if batch {
        println!("{added} added, {failed} failed");
    }
    Ok(failed == 0)
}

fn add_one(
    context: &RunContext,
    store: &FileReferenceStore,
    file: &Path,
    method: &str,
) -> Result<ReferenceRecord> {
    let xml = fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    Ok(add_reference(context, store, &file.to_string_lossy(), method, &xml)?)
}

fn list(settings: &Settings, method: Option<&str>) -> Result<bool> {
    let store = settings.connect()?;
    let method = method.map(|m| settings.context.resolve_method(m));
    let references = store.list(method)?;
    if references.is_empty() {
        println!("No references stored.");
        return Ok(true);
    }

    let name_width = references.iter().map(|r| r.filename.len()).max().unwrap_or(0).max(8);
    let method_width = references.iter().map(|r| r.method.len()).max().unwrap_or(0).max(6);
    println!("{:<name_width$}  {:<method_width$}  {:<19}  {:<19}", "FILENAME", "METHOD", "CREATED", "UPDATED");
    for r in &references {
        println!(
            "{:<name_width$}  {:<method_width$}  {}  {}",
            r.filename,
            r.method,
            r.created_at.format("%Y-%m-%d %H:%M:%S"),
            r.updated_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    Ok(true)
}

fn test(
    settings: &Settings,
    path: &Path,
    method: &str,
    json: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<bool> {
    let files = if path.is_dir() { xml_files(path)? } else { vec![path.to_path_buf()] };

    let mut run = Orchestrator::new(settings.context.clone(), FileReferenceStore::connect(&settings.config.store));
    if files.is_empty() {
        run.note(format!("No *.xml files in {}", path.display()));
    }
    for file in &files {
        if run.is_aborted() {
            break;
        }
        let name = file.to_string_lossy();
        match fs::read_to_string(file) {
            Ok(xml) => {
                run.test_document(&name, method, &xml);
            }
            Err(e) => run.record_error(&name, method, format!("cannot read {}: {e}", file.display())),
        }
    }

    let report = run.finish();
    let text = report.render(&RenderOptions {
        verbose: settings.verbose,
    });
    WriterSink::new(io::stdout().lock()).emit(&text)?;
    if let Some(p) = report_path {
        FileSink::new(p)
            .emit(&text)
            .with_context(|| format!("cannot write report to {}", p.display()))?;
    }
    if let Some(p) = json {
        FileSink::new(p)
            .emit(&report.to_json()?)
            .with_context(|| format!("cannot write JSON report to {}", p.display()))?;
    }

    let counts = report.counts();
    info!(pass = counts.pass, fail = counts.fail, warn = counts.warn, error = counts.error, "test run finished");
    Ok(report.all_passed())
}

fn remove(settings: &Settings, filename: &str, method: &str) -> Result<bool> {
    let store = settings.connect()?;
    let method = settings.context.resolve_method(method);
    if store.remove(method, filename)? {
        println!("Removed reference {filename} [{method}]");
        Ok(true)
    } else {
        println!("No reference for {filename} [{method}]");
        Ok(false)
    }
}

fn inspect(path: &Path) -> Result<bool> {
    let xml = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let tree = document_tree(&xml)?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(true)
}

/// `*.xml` files directly inside `dir`, sorted by name.
fn xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot list {}", dir.display()))?;
        let is_xml = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if entry.file_type().is_file() && is_xml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
