//! Status command: counts by readiness label.

use crate::cli::commands::{CommandContext, print_json};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_status_summary;
use std::path::Path;
use tracing::info;

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(workspace: &Path, json: bool, cli: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(workspace, cli)?;
    let summary = ctx.queries.status_summary(&ctx.workspace)?;
    info!(total = summary.total, ready = summary.ready, "Computed status summary");

    if json {
        return print_json(&summary);
    }
    print!("{}", format_status_summary(&summary, ctx.use_color));
    Ok(())
}
