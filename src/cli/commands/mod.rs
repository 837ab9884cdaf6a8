//! Command implementations.

pub mod completions;
pub mod list;
pub mod ready;
pub mod status;

use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::format::{TextFormatOptions, terminal_width};
use crate::query::ReadinessQueries;
use crate::storage::{IssueStore, JsonlStore, SqliteStore, WorkspaceRef};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Everything a query command needs, resolved from flags and config.
pub struct CommandContext {
    pub workspace: WorkspaceRef,
    pub queries: ReadinessQueries<dyn IssueStore>,
    pub use_color: bool,
}

impl CommandContext {
    /// Resolve config layers and pick the store for `workspace`.
    ///
    /// A missing `.beads` directory is not an error here: an explicit
    /// `--db`/`--jsonl` path may still work, and otherwise the store reports
    /// `RepositoryNotFound` when queried.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be parsed or holds bad values.
    pub fn load(workspace: &Path, cli: &CliOverrides) -> Result<Self> {
        let beads_dir = config::discover_beads_dir(workspace).ok();
        let layer = config::load_config(beads_dir.as_deref(), cli)?;

        let store: Arc<dyn IssueStore> = if let Some(path) = config::jsonl_override_from_layer(&layer) {
            debug!(path = %path.display(), "Using JSONL store");
            Arc::new(JsonlStore::with_path(path))
        } else {
            let mut sqlite =
                SqliteStore::new().with_lock_timeout(config::lock_timeout_from_layer(&layer)?);
            if let Some(path) = config::db_override_from_layer(&layer) {
                debug!(path = %path.display(), "Using explicit database");
                sqlite = sqlite.with_db_path(path);
            }
            Arc::new(sqlite)
        };

        let mut queries = ReadinessQueries::from_arc(store)
            .with_config(config::readiness_config_from_layer(&layer));
        if let Some(deadline) = config::deadline_from_layer(&layer)? {
            queries = queries.with_deadline(deadline);
        }

        Ok(Self {
            workspace: WorkspaceRef::new(workspace),
            queries,
            use_color: config::should_use_color(&layer),
        })
    }

    /// Text options for stdout: wrap to the terminal only when attached to one.
    #[must_use]
    pub fn text_options(&self) -> TextFormatOptions {
        TextFormatOptions {
            use_color: self.use_color,
            max_width: std::io::stdout().is_terminal().then(terminal_width),
        }
    }
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Apply a `--limit` where 0 means unlimited.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: usize) {
    if limit > 0 && items.len() > limit {
        items.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_zero_is_unlimited() {
        let mut items = vec![1, 2, 3];
        apply_limit(&mut items, 0);
        assert_eq!(items.len(), 3);
        apply_limit(&mut items, 2);
        assert_eq!(items, vec![1, 2]);
        apply_limit(&mut items, 10);
        assert_eq!(items.len(), 2);
    }
}
