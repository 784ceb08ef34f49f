//! Error types for configuration loading.
//!
//! Invariants:
//! - All error variants include context for debugging (variable names, paths, etc.).
//! - Dotenv errors NEVER include raw .env line contents.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error(
        "Invalid variable prefix '{prefix}': \
         must be non-empty and end with one of '_', '-' or '.'"
    )]
    InvalidVariablePrefix { prefix: String },

    #[error("Invalid time zone for {var}: '{id}' is not a known Windows or IANA zone identifier")]
    InvalidTimeZone { var: String, id: String },

    #[error("Invalid namespace '{namespace}': {message}")]
    InvalidNamespace { namespace: String, message: String },

    #[error("Invalid class name '{class_name}': {message}")]
    InvalidClassName { class_name: String, message: String },

    #[error("Invalid registry key path '{path}': {message}")]
    InvalidRegistryPath { path: String, message: String },

    #[error("Unable to determine config directory: {0}")]
    ConfigDirUnavailable(String),

    #[error("Failed to read config file at {path}")]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}")]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// Only the byte index of the failure is reported, never the line itself.
    #[error(
        "Failed to parse .env file at position {error_index}. \
         Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
