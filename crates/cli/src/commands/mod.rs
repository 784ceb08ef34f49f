//! Command implementations for the `osdinfo` CLI.
//!
//! Responsibilities:
//! - Run the collection phase shared by every command.
//! - Expose one `run` function per subcommand.

pub mod collect;
pub mod record;
pub mod schema;

use anyhow::Result;
use osdinfo_core::{EntryCollection, VariableCollector};
use tracing::info;

use crate::context::RunContext;

/// Collect typed entries from the selected source.
///
/// An unavailable source yields an empty collection.
pub(crate) fn collect_entries(ctx: &RunContext) -> Result<EntryCollection> {
    let Some(source) = ctx.open_source()? else {
        return Ok(EntryCollection::new());
    };

    let collector = VariableCollector::from_config(&ctx.config);
    let entries = collector.collect(source.as_ref(), &ctx.config.collection.variable_prefix);
    info!(
        count = entries.len(),
        prefix = %ctx.config.collection.variable_prefix,
        "Collection finished"
    );
    Ok(entries)
}
