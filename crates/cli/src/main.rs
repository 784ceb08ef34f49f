//! OSDInfo - record operating system deployment information.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Build the validated configuration and install logging.
//! - Run the selected command and translate its outcome into an exit code.
//!
//! Does NOT handle:
//! - Inference, schema synthesis or store access (see `crates/core`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Configuration precedence is file < environment < command line.
//! - Command failures are reported once, through the logging layers.
//! - With `continue_on_error` an unexpected failure is logged and the exit code is 0.

mod args;
mod commands;
mod context;
mod dispatch;
mod error;
mod logging;
mod output;

use args::Cli;
use clap::Parser;
use context::RunContext;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use logging::init_logging;
use osdinfo_config::ConfigLoader;

fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();

    // Blank/whitespace-only values are ignored to allow fallback to the default location
    if let Some(ref path) = cli.config_path {
        let path_str = path.to_string_lossy();
        if !path_str.trim().is_empty() {
            loader = loader.with_config_path(path.clone());
        }
    }

    let config = match loader
        .from_file()
        .and_then(|l| l.from_env())
        .and_then(|l| cli.apply_overrides(l).build())
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to build configuration: {:#}", e);
            std::process::exit(ExitCode::ConfigError.as_i32());
        }
    };

    // Note: the guard must live for the entire main() duration so file logs are flushed
    let log_guard = match init_logging(config.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };

    let continue_on_error = config.continue_on_error;
    let ctx = RunContext::new(&cli, config);

    let exit_code = match run_command(cli.command, &ctx) {
        Ok(()) => ExitCode::Success,
        Err(e) if continue_on_error => {
            tracing::error!("Run failed, continuing on error: {:#}", e);
            ExitCode::Success
        }
        Err(e) => {
            tracing::error!("Run failed: {:#}", e);
            e.exit_code()
        }
    };

    // Dropping the guard flushes the file writer; process::exit skips destructors.
    drop(log_guard);
    std::process::exit(exit_code.as_i32());
}
