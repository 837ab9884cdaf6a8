//! List command: every issue with its computed label.

use crate::cli::ListArgs;
use crate::cli::commands::{CommandContext, apply_limit, print_json};
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_task_line;
use std::path::Path;
use tracing::{debug, info};

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn execute(workspace: &Path, args: &ListArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(workspace, cli)?;
    let mut tasks = ctx.queries.all_tasks(&ctx.workspace)?;

    if !args.label.is_empty() {
        tasks.retain(|task| args.label.contains(&task.computed_label));
        debug!(labels = ?args.label, remaining = tasks.len(), "Filtered by label");
    }
    apply_limit(&mut tasks, args.limit);
    info!(count = tasks.len(), "Listing tasks");

    if json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    let options = ctx.text_options();
    for task in &tasks {
        println!("{}", format_task_line(task, options));
    }
    Ok(())
}
