//! `schema` command: print or save the synthesized schema text.

use std::path::PathBuf;

use anyhow::Result;
use osdinfo_core::SchemaSynthesizer;
use tracing::{info, warn};

use crate::commands::collect_entries;
use crate::context::RunContext;
use crate::output::write_to_file;

pub fn run(ctx: &RunContext, output_file: Option<PathBuf>) -> Result<()> {
    let entries = collect_entries(ctx)?;
    if entries.is_empty() {
        warn!("No entries collected, the schema declares only the key property");
    }

    let wmi = &ctx.config.wmi;
    let schema = SchemaSynthesizer.synthesize(
        &entries,
        &wmi.namespace,
        &wmi.class_name,
        &wmi.class_description,
    );

    match output_file {
        Some(path) => {
            write_to_file(&schema, &path)?;
            info!(path = %path.display(), "Schema written");
        }
        None => print!("{schema}"),
    }
    Ok(())
}
