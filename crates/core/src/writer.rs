//! Writing collected entries to the stores.
//!
//! Responsibilities:
//! - Write every entry's display string to the hierarchical store.
//! - Write schema text to the working directory, compile it, then assign
//!   every property shared by the collection and the created instance.
//!
//! Invariants:
//! - `write_all` is idempotent and never deletes values.
//! - A failure on one entry or property is recorded in the report and the
//!   remaining entries are still written.
//! - A failed compile stops `publish` before any property is assigned.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::entries::EntryCollection;
use crate::error::StoreError;
use crate::schema::INSTANCE_KEY_PROPERTY;
use crate::store::{
    CompileOutput, HierarchicalStore, SchemaCompiler, StructuredStore, ValueKind, write_atomic,
};

/// A single entry that could not be written.
#[derive(Debug)]
pub struct EntryFailure {
    pub name: String,
    pub error: StoreError,
}

/// Outcome of `StoreWriter::write_all`.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: usize,
    pub failures: Vec<EntryFailure>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of `StoreWriter::publish`.
#[derive(Debug)]
pub struct PublishReport {
    /// Where the schema text was written.
    pub schema_path: PathBuf,
    pub compile: CompileOutput,
    /// Properties assigned on the instance.
    pub assigned: usize,
    /// Entries with no matching instance property.
    pub skipped: Vec<String>,
    pub failures: Vec<EntryFailure>,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes entry collections to the hierarchical and structured stores.
#[derive(Debug, Clone)]
pub struct StoreWriter {
    work_dir: PathBuf,
    auto_recover: bool,
}

impl StoreWriter {
    /// Schema files are written to `work_dir`; auto-recover is on.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            auto_recover: true,
        }
    }

    pub fn with_auto_recover(mut self, auto_recover: bool) -> Self {
        self.auto_recover = auto_recover;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the schema file for `class_name`.
    pub fn schema_path(&self, class_name: &str) -> PathBuf {
        self.work_dir.join(format!("{class_name}.mof"))
    }

    /// Write each entry as a string value under `base_path`.
    pub fn write_all(
        &self,
        store: &mut dyn HierarchicalStore,
        entries: &EntryCollection,
        base_path: &str,
    ) -> WriteReport {
        let mut report = WriteReport::default();
        for entry in entries {
            let value = entry.value().display_string();
            match store.write_value(base_path, entry.name(), &value, ValueKind::String) {
                Ok(()) => report.written += 1,
                Err(error) => {
                    warn!(
                        name = %entry.name(),
                        path = %base_path,
                        error = %error,
                        "Failed to write registry value"
                    );
                    report.failures.push(EntryFailure {
                        name: entry.name().to_string(),
                        error,
                    });
                }
            }
        }
        info!(
            path = %base_path,
            written = report.written,
            failed = report.failures.len(),
            "Wrote entries to registry"
        );
        report
    }

    /// Compile `schema_text` and populate the instance from `entries`.
    pub fn publish(
        &self,
        compiler: &dyn SchemaCompiler,
        store: &mut dyn StructuredStore,
        schema_text: &str,
        entries: &EntryCollection,
        namespace: &str,
        class_name: &str,
    ) -> Result<PublishReport, StoreError> {
        let schema_path = self.schema_path(class_name);
        write_atomic(&schema_path, schema_text)?;
        debug!(path = %schema_path.display(), "Wrote schema file");

        let compile = compiler
            .compile(&schema_path, self.auto_recover)?
            .into_result()?;
        info!(
            namespace = %namespace,
            class = %class_name,
            exit_code = ?compile.exit_code,
            "Compiled schema"
        );

        let properties = store
            .instance_properties(namespace, class_name)?
            .ok_or_else(|| StoreError::InstanceNotFound {
                namespace: namespace.to_string(),
                class_name: class_name.to_string(),
            })?;

        let mut report = PublishReport {
            schema_path,
            compile,
            assigned: 0,
            skipped: Vec::new(),
            failures: Vec::new(),
        };

        for entry in entries {
            let name = entry.name();
            let on_instance = !name.eq_ignore_ascii_case(INSTANCE_KEY_PROPERTY)
                && properties.iter().any(|p| p.eq_ignore_ascii_case(name));
            if !on_instance {
                debug!(name = %name, "No matching instance property; skipping");
                report.skipped.push(name.to_string());
                continue;
            }

            match store.set_property(namespace, class_name, name, entry.value()) {
                Ok(()) => report.assigned += 1,
                Err(error) => {
                    warn!(name = %name, error = %error, "Failed to set instance property");
                    report.failures.push(EntryFailure {
                        name: name.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            class = %class_name,
            assigned = report.assigned,
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Populated instance"
        );
        Ok(report)
    }
}
