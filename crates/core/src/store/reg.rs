//! Hierarchical store backed by the Windows `reg.exe` tool.

use std::process::Command;

use super::{HierarchicalStore, ValueKind};
use crate::error::StoreError;

/// Writes values with `reg add`.
#[derive(Debug, Clone)]
pub struct RegExeStore {
    program: String,
}

impl Default for RegExeStore {
    fn default() -> Self {
        Self {
            program: "reg.exe".to_string(),
        }
    }
}

impl RegExeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable (for tests and non-standard hosts).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Arguments of `reg add` for one value, in the 64-bit registry view.
fn add_args(path: &str, name: &str, value: &str, kind: ValueKind) -> Vec<String> {
    vec![
        "add".to_string(),
        path.to_string(),
        "/v".to_string(),
        name.to_string(),
        "/t".to_string(),
        kind.reg_type().to_string(),
        "/d".to_string(),
        value.to_string(),
        "/f".to_string(),
        "/reg:64".to_string(),
    ]
}

impl HierarchicalStore for RegExeStore {
    fn write_value(
        &mut self,
        path: &str,
        name: &str,
        value: &str,
        kind: ValueKind,
    ) -> Result<(), StoreError> {
        let output = Command::new(&self.program)
            .args(add_args(path, name, value, kind))
            .output()
            .map_err(|source| StoreError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            tracing::trace!(path = %path, name = %name, "Wrote registry value");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(StoreError::Registry {
            path: path.to_string(),
            name: name.to_string(),
            message,
        })
    }
}
