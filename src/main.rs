use clap::{CommandFactory, Parser};
use expense_export::args::Args;
use expense_export::{commands, Mode, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    let Some(input) = args.input().map(PathBuf::from) else {
        // Without an input there is nothing to read: show usage and fail.
        if let Err(e) = Args::command().print_help() {
            error!("Unable to print usage: {e}");
        }
        return ExitCode::FAILURE;
    };

    match main_inner(&args, &input).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: &Args, input: &Path) -> Result<()> {
    trace!("{args:?}");
    // When EXPENSE_EXPORT_IN_TEST_MODE is set and non-empty the sheet is kept in memory and
    // nothing is sent to Google.
    let mode = Mode::from_env();
    commands::run(args, input, mode).await?.print();
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only. The library and
            // the binary share the crate name.
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
