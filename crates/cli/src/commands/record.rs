//! `record` command: collect entries and write them to the enabled stores.
//!
//! Responsibilities:
//! - Write every entry to the registry key when the registry output is on.
//! - Synthesize, compile and populate the WMI class when the WMI output is on.
//! - Print a run summary and map store failures to exit codes.
//!
//! Invariants:
//! - An empty collection writes nothing and succeeds.
//! - A compile failure stops the run unless `continue_on_error` is set.
//! - Per-entry write failures never stop the remaining entries.

use anyhow::{Context, Result};
use osdinfo_core::{EntryFailure, SchemaSynthesizer};
use tracing::{error, info, warn};

use crate::args::OutputFormat;
use crate::commands::collect_entries;
use crate::context::{RunContext, Stores};
use crate::error::PartialWriteError;
use crate::output::{FailureSummary, RecordSummary, format_summary_json, format_summary_table};

pub fn run(ctx: &RunContext, output: OutputFormat) -> Result<()> {
    let config = &ctx.config;
    let entries = collect_entries(ctx)?;
    let mut summary = RecordSummary {
        collected: entries.len(),
        ..RecordSummary::default()
    };

    if entries.is_empty() {
        warn!("No entries collected, skipping store writes");
    } else if !config.has_output() {
        warn!("Registry and WMI output are both disabled, nothing to write");
    } else {
        let Stores {
            mut registry,
            mut structured,
            compiler,
        } = ctx.stores();
        let writer = ctx.writer();

        if config.registry.enabled {
            let report = writer.write_all(registry.as_mut(), &entries, &config.registry.key_path);
            summary.registry_written = Some(report.written);
            summary
                .failures
                .extend(report.failures.into_iter().map(|f| failure("registry", f)));
        }

        if config.wmi.enabled {
            let wmi = &config.wmi;
            let schema = SchemaSynthesizer.synthesize(
                &entries,
                &wmi.namespace,
                &wmi.class_name,
                &wmi.class_description,
            );
            match writer.publish(
                compiler.as_ref(),
                structured.as_mut(),
                &schema,
                &entries,
                &wmi.namespace,
                &wmi.class_name,
            ) {
                Ok(report) => {
                    summary.wmi_assigned = Some(report.assigned);
                    summary.skipped = report.skipped;
                    summary
                        .failures
                        .extend(report.failures.into_iter().map(|f| failure("wmi", f)));
                }
                Err(e) if config.continue_on_error => {
                    error!(
                        error = %e,
                        class = %wmi.class_name,
                        "Failed to publish WMI class, continuing"
                    );
                    summary.failures.push(FailureSummary {
                        store: "wmi",
                        name: wmi.class_name.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to publish WMI class {}", wmi.class_name)
                    });
                }
            }
        }
    }

    let rendered = match output {
        OutputFormat::Table => format_summary_table(&summary),
        OutputFormat::Json => format_summary_json(&summary)?,
    };
    print!("{rendered}");

    let failed = summary.failures.len();
    if failed == 0 {
        info!(collected = summary.collected, "Record finished");
        Ok(())
    } else if config.continue_on_error {
        warn!(failed, "Record finished with failures");
        Ok(())
    } else {
        Err(PartialWriteError { failed }.into())
    }
}

fn failure(store: &'static str, failure: EntryFailure) -> FailureSummary {
    FailureSummary {
        store,
        name: failure.name,
        error: failure.error.to_string(),
    }
}
