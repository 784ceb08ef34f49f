//! Run context: the validated config plus the selected source and stores.
//!
//! Responsibilities:
//! - Open the variable source selected on the command line.
//! - Construct the hierarchical store, structured store and schema compiler
//!   for the selected backend.
//! - Resolve the working directory for generated schema files.
//!
//! Does NOT handle:
//! - Collection or store writes (see `commands`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use osdinfo_config::Config;
use osdinfo_core::store::{
    ExternalCompiler, JsonRegistryStore, JsonStructuredStore, LocalCompiler, PowerShellCimStore,
    RegExeStore,
};
use osdinfo_core::{
    EnvSource, HierarchicalStore, JsonFileSource, SchemaCompiler, SourceError, StoreWriter,
    StructuredStore, VariableSource,
};
use tracing::warn;

use crate::args::{Cli, SourceKind, StoreBackend};

/// File of the local hierarchical store inside the store directory.
pub const REGISTRY_FILE_NAME: &str = "registry.json";

/// File of the local structured store inside the store directory.
pub const WMI_FILE_NAME: &str = "wmi.json";

/// Everything a command needs besides its own arguments.
pub struct RunContext {
    pub config: Config,
    source_kind: SourceKind,
    source_file: Option<PathBuf>,
    backend: StoreBackend,
    store_dir: PathBuf,
}

/// Stores of one backend, ready for a `StoreWriter`.
pub struct Stores {
    pub registry: Box<dyn HierarchicalStore>,
    pub structured: Box<dyn StructuredStore>,
    pub compiler: Box<dyn SchemaCompiler>,
}

impl RunContext {
    pub fn new(cli: &Cli, config: Config) -> Self {
        let store_dir = cli.store_dir.clone().unwrap_or_else(default_store_dir);
        Self {
            config,
            source_kind: cli.source_kind(),
            source_file: cli.source_file.clone(),
            backend: cli.store_backend,
            store_dir,
        }
    }

    /// Open the variable source.
    ///
    /// Returns `None` when the source is unavailable; the caller skips the
    /// collection phase.
    pub fn open_source(&self) -> Result<Option<Box<dyn VariableSource>>> {
        match self.source_kind {
            SourceKind::Env => Ok(Some(Box::new(EnvSource))),
            SourceKind::File => {
                let path = self
                    .source_file
                    .as_deref()
                    .context("--source file requires --source-file")?;
                match JsonFileSource::load(path) {
                    Ok(source) => Ok(Some(Box::new(source))),
                    Err(SourceError::Unavailable { path }) => {
                        warn!(
                            path = %path.display(),
                            "Deployment environment unavailable, skipping collection"
                        );
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Construct the stores of the selected backend.
    pub fn stores(&self) -> Stores {
        match self.backend {
            StoreBackend::Local => {
                let wmi_path = self.store_dir.join(WMI_FILE_NAME);
                Stores {
                    registry: Box::new(JsonRegistryStore::new(
                        self.store_dir.join(REGISTRY_FILE_NAME),
                    )),
                    structured: Box::new(JsonStructuredStore::new(&wmi_path)),
                    compiler: Box::new(LocalCompiler::new(&wmi_path)),
                }
            }
            StoreBackend::Native => Stores {
                registry: Box::new(RegExeStore::new()),
                structured: Box::new(PowerShellCimStore::new()),
                compiler: Box::new(ExternalCompiler::new(self.config.wmi.compiler_path.clone())),
            },
        }
    }

    /// Writer whose schema files land in the log directory, else next to the
    /// local stores, else in the temp directory.
    pub fn writer(&self) -> StoreWriter {
        StoreWriter::new(self.work_dir())
    }

    fn work_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.config.log_dir {
            return dir.clone();
        }
        match self.backend {
            StoreBackend::Local => self.store_dir.clone(),
            StoreBackend::Native => std::env::temp_dir(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "osdinfo")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
