//! Error types for the OSDInfo engine.

use std::path::PathBuf;

use thiserror::Error;

/// A value was recognized as a type but could not be converted into it.
///
/// Collection contains these per entry: the entry is skipped, the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The local time falls into a daylight-saving gap of the source zone.
    #[error("local time {value} does not exist in the source time zone")]
    NonexistentLocalTime { value: String },

    /// The converted instant cannot be represented.
    #[error("timestamp {value} is out of range after time zone conversion")]
    OutOfRange { value: String },
}

/// Errors reading the deployment environment.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The environment export does not exist; the collection phase is skipped.
    #[error("deployment environment unavailable at {path}")]
    Unavailable { path: PathBuf },

    #[error("failed to read deployment environment at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse deployment environment at {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Errors writing to either store or running the schema compiler.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to launch {program}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The schema compiler exited with a failure code.
    #[error(
        "schema compilation failed ({}): {}",
        exit_label(.exit_code),
        diagnostic(.stdout, .stderr)
    )]
    CompileFailed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("schema text rejected at line {line}: {message}")]
    Schema { line: usize, message: String },

    #[error("no instance of {class_name} in namespace {namespace}")]
    InstanceNotFound {
        namespace: String,
        class_name: String,
    },

    #[error("class {class_name} has no property {property}")]
    PropertyNotFound {
        class_name: String,
        property: String,
    },

    #[error("property {property} is declared {declared} but the value is {actual}")]
    TypeMismatch {
        property: String,
        declared: String,
        actual: String,
    },

    #[error("registry write to {path}\\{name} failed: {message}")]
    Registry {
        path: String,
        name: String,
        message: String,
    },

    #[error("structured store command failed: {message}")]
    Command { message: String },
}

/// First non-empty diagnostic stream, trimmed.
fn exit_label(exit_code: &Option<i32>) -> String {
    exit_code.map_or_else(|| "terminated".to_string(), |code| code.to_string())
}

fn diagnostic(stdout: &str, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.to_string()
    }
}

impl StoreError {
    /// True for failures of the external compile operation.
    pub fn is_compile_failure(&self) -> bool {
        matches!(
            self,
            Self::CompileFailed { .. } | Self::Schema { .. } | Self::Launch { .. }
        )
    }
}
