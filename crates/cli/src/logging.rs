//! Logging setup for the `osdinfo` binary.
//!
//! Responsibilities:
//! - Install the global `tracing` subscriber.
//! - Mirror events to `osdinfo.log` in the configured log directory.
//!
//! Invariants:
//! - Console output goes to stderr so stdout stays machine-readable.
//! - The returned guard must live until the process exits or buffered file
//!   events are lost.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "osdinfo.log";

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initialize logging, returning the file writer guard when a log directory is set.
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let console = fmt::layer().with_writer(std::io::stderr).with_filter(filter());

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(console)
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(non_blocking)
                        .with_filter(filter()),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(console).init();
            Ok(None)
        }
    }
}
