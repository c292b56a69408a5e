//! CLI for the embedding test harness.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Command
//! functions return `CliResult<T>` instead of calling `process::exit`; only
//! the top-level `run()` function handles errors and exits. The tracing
//! subscriber is installed here because its default filter level depends on
//! the `--debug` flag.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::HarnessConfig;
use crate::harness;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Drive the embedding library's integration test units end to end.
#[derive(Parser, Debug)]
#[command(name = "embed-harness")]
#[command(version)]
#[command(about = "End-to-end test harness for the directory embedding library", long_about = None)]
pub struct Cli {
    /// Glob patterns selecting test units (default: every unit)
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Enable debug output and verbose toolchain invocations
    #[arg(short, long)]
    pub debug: bool,

    /// Run the tests sequentially instead of in parallel
    #[arg(short, long)]
    pub sequential: bool,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. The command
/// implementation returns `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();
    init_telemetry(cli.debug);

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Install the global tracing subscriber. `--debug` raises the default
/// filter level; `RUST_LOG` still overrides it.
fn init_telemetry(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Run the harness and map the aggregate outcome to an exit code.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = HarnessConfig::new(cli.debug, cli.sequential);
    if !config.test_dir.is_dir() {
        return Err(CliError::failure(format!(
            "test unit directory not found: {}",
            config.test_dir.display()
        )));
    }

    let report = harness::run(&config, &cli.patterns)
        .map_err(|e| CliError::failure(format!("test discovery failed: {e}")))?;

    info!(
        "{} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    );

    if report.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// Tests
// ============================================================================
