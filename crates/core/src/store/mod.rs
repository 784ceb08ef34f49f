//! Store seams and their implementations.
//!
//! Responsibilities:
//! - Define the hierarchical store, structured store and schema compiler traits.
//! - Provide JSON-file backed stores for portable runs.
//! - Provide the Windows backends: `reg.exe`, `mofcomp` and PowerShell CIM.
//! - Provide an in-process compiler for the JSON structured store.
//!
//! Invariants:
//! - A compile succeeds when the exit code is 0 or 3010 (success, reboot
//!   required).
//! - JSON store files are replaced atomically.

mod cim;
mod compiler;
mod json;
mod local;
mod reg;

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::value::TypedValue;

pub use cim::PowerShellCimStore;
pub use compiler::ExternalCompiler;
pub use json::{ClassRecord, JsonRegistryStore, JsonStructuredStore, RegistryValue};
pub use local::LocalCompiler;
pub use reg::RegExeStore;

/// Exit code for a successful compile that requires a restart.
pub const SUCCESS_REBOOT_REQUIRED: i32 = 3010;

/// Kind of a hierarchical store value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValueKind {
    #[default]
    #[serde(rename = "REG_SZ")]
    String,
}

impl ValueKind {
    pub fn reg_type(self) -> &'static str {
        match self {
            ValueKind::String => "REG_SZ",
        }
    }
}

/// A registry-like store of named string values under key paths.
pub trait HierarchicalStore {
    /// Create or overwrite `name` under `path`.
    fn write_value(
        &mut self,
        path: &str,
        name: &str,
        value: &str,
        kind: ValueKind,
    ) -> Result<(), StoreError>;
}

/// A WMI-like class/instance store.
pub trait StructuredStore {
    /// Property names of the single instance of `class_name`, or `None` when
    /// the class has no instance.
    fn instance_properties(
        &self,
        namespace: &str,
        class_name: &str,
    ) -> Result<Option<Vec<String>>, StoreError>;

    /// Assign `value` to `property` of the instance of `class_name`.
    fn set_property(
        &mut self,
        namespace: &str,
        class_name: &str,
        property: &str,
        value: &TypedValue,
    ) -> Result<(), StoreError>;
}

/// Result of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CompileOutput {
    pub fn is_success(&self) -> bool {
        matches!(self.exit_code, Some(0) | Some(SUCCESS_REBOOT_REQUIRED))
    }

    /// Convert a failed run into `StoreError::CompileFailed`.
    pub fn into_result(self) -> Result<CompileOutput, StoreError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(StoreError::CompileFailed {
                exit_code: self.exit_code,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Compiles schema text files into the structured store.
pub trait SchemaCompiler {
    fn compile(&self, path: &Path, auto_recover: bool) -> Result<CompileOutput, StoreError>;
}

/// Write `content` to `path` through a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_err)?;

    let mut temp_file = NamedTempFile::new_in(parent).map_err(io_err)?;
    temp_file.write_all(content.as_bytes()).map_err(io_err)?;
    temp_file.flush().map_err(io_err)?;
    temp_file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Read and parse a JSON store file; a missing file yields the default document.
pub(crate) fn read_document<T>(path: &Path) -> Result<T, StoreError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize and atomically write a JSON store file.
pub(crate) fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(document).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &content)
}
