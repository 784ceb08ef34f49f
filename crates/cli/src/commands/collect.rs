//! `collect` command: print typed entries without touching any store.

use anyhow::Result;

use crate::args::OutputFormat;
use crate::commands::collect_entries;
use crate::context::RunContext;
use crate::output::{format_entries_json, format_entries_table};

pub fn run(ctx: &RunContext, output: OutputFormat) -> Result<()> {
    let entries = collect_entries(ctx)?;
    let rendered = match output {
        OutputFormat::Table => format_entries_table(&entries),
        OutputFormat::Json => format_entries_json(&entries)?,
    };
    print!("{rendered}");
    Ok(())
}
