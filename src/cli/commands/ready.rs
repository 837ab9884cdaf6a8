//! Ready command: issues that can be started now.

use crate::cli::ReadyArgs;
use crate::cli::commands::{CommandContext, apply_limit, print_json};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_ready_line;
use std::path::Path;
use tracing::{info, trace};

/// Execute the ready command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(workspace: &Path, args: &ReadyArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(workspace, cli)?;
    let mut ready = ctx.queries.ready_tasks(&ctx.workspace)?;
    let available = ready.len();
    apply_limit(&mut ready, args.limit);

    info!(count = ready.len(), available, "Found ready issues");
    for task in ready.iter().take(5) {
        trace!(id = %task.id, priority = task.priority.0, "Ready issue");
    }

    if json {
        return print_json(&ready);
    }
    if ready.is_empty() {
        println!("No ready issues.");
        return Ok(());
    }

    let options = ctx.text_options();
    println!("Ready to work ({} of {available}):", ready.len());
    for (i, task) in ready.iter().enumerate() {
        println!("{}", format_ready_line(i + 1, task, options));
    }
    Ok(())
}
