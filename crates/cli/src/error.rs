//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that task sequences can branch on.
//! - Map configuration and store errors to the matching exit code.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use osdinfo_config::ConfigError;
use osdinfo_core::StoreError;
use thiserror::Error;

/// Structured exit codes for `osdinfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - every enabled store was written.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Configuration error - invalid config file, environment or flags.
    ///
    /// Scripts should fix the configuration and not retry.
    ConfigError = 2,

    /// Schema compilation failed - the structured store was not updated.
    CompileFailed = 3,

    /// Some values could not be written to a store.
    PartialWrite = 4,

    /// Interrupted - SIGINT/Ctrl+C (Unix standard: 128 + 2).
    #[allow(dead_code)]
    Interrupted = 130,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&StoreError> for ExitCode {
    fn from(err: &StoreError) -> Self {
        if err.is_compile_failure() {
            ExitCode::CompileFailed
        } else {
            ExitCode::GeneralError
        }
    }
}

/// One or more entries failed to reach a store during `record`.
#[derive(Error, Debug)]
#[error("{failed} value(s) could not be written to the stores")]
pub struct PartialWriteError {
    pub failed: usize,
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(store_err) = cause.downcast_ref::<StoreError>() {
                return ExitCode::from(store_err);
            }
            if cause.downcast_ref::<PartialWriteError>().is_some() {
                return ExitCode::PartialWrite;
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ExitCode::ConfigError;
            }
        }

        ExitCode::GeneralError
    }
}
