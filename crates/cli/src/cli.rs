use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Regression tests for calculation outputs.
///
/// Extracts metrics from result XML documents and compares them with golden
/// references captured earlier, within a percentage tolerance.
#[derive(Parser, Debug)]
#[command(name = "regtest", version, about)]
pub struct CliArgs {
    /// Path to the TOML file with extraction profiles and method aliases
    /// (default: ./regtest.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment profile; keys are read as {PROFILE}_{KEY} first
    #[arg(long, global = true, env = "REGTEST_PROFILE")]
    pub profile: Option<String>,

    /// Reference store directory (overrides REGTEST_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Allowed percent difference for numeric metrics (overrides REGTEST_TOLERANCE_PERCENT)
    #[arg(long, global = true)]
    pub tolerance: Option<f64>,

    /// Info-level logs on stderr and per-key tables for passing cases
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a document and store its metrics as the golden reference
    AddReference {
        /// XML document, or a directory of documents with --batch
        path: PathBuf,
        /// Calculation method, e.g. beam
        method: String,
        /// Add every *.xml file in the directory
        #[arg(long)]
        batch: bool,
    },

    /// List stored references
    List {
        /// Only references of this method
        #[arg(long)]
        method: Option<String>,
    },

    /// Test documents against their references
    Test {
        /// XML document, or a directory whose *.xml files are all tested
        path: PathBuf,
        /// Calculation method, e.g. beam
        method: String,
        /// Also write the report as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Also write the text report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Delete a stored reference so it can be captured again
    RemoveReference {
        /// File name the reference was stored under
        filename: String,
        method: String,
    },

    /// Print the JSON tree of an XML document
    Inspect { path: PathBuf },
}
