mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::cli::CliArgs;

fn main() -> ExitCode {
    // Before parsing, so .env can supply REGTEST_PROFILE
    regtest_core::config::load_dotenv();
    let args = CliArgs::parse();

    // Logs go to stderr; stdout carries the report
    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match commands::run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
