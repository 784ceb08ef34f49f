//! External schema compiler (`mofcomp`).

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{CompileOutput, SchemaCompiler};
use crate::error::StoreError;

/// Runs the schema compiler binary and waits for it without a timeout.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    program: PathBuf,
}

impl ExternalCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

fn compile_args(path: &Path, auto_recover: bool) -> Vec<std::ffi::OsString> {
    let mut args = Vec::with_capacity(2);
    if auto_recover {
        args.push("-autorecover".into());
    }
    args.push(path.as_os_str().to_os_string());
    args
}

impl SchemaCompiler for ExternalCompiler {
    fn compile(&self, path: &Path, auto_recover: bool) -> Result<CompileOutput, StoreError> {
        tracing::debug!(
            program = %self.program.display(),
            file = %path.display(),
            auto_recover,
            "Running schema compiler"
        );

        let output = Command::new(&self.program)
            .args(compile_args(path, auto_recover))
            .output()
            .map_err(|source| StoreError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        Ok(CompileOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
