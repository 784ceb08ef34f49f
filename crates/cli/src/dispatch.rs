//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the matching command handler.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Configuration loading (see `main()`).

use anyhow::Result;

use crate::args::Commands;
use crate::commands;
use crate::context::RunContext;

/// Dispatch `command` to its handler.
pub(crate) fn run_command(command: Commands, ctx: &RunContext) -> Result<()> {
    match command {
        Commands::Record { output } => commands::record::run(ctx, output),
        Commands::Collect { output } => commands::collect::run(ctx, output),
        Commands::Schema { output_file } => commands::schema::run(ctx, output_file),
    }
}
