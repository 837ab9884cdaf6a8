//! Read-only adapter over a beads JSONL export.
//!
//! One issue per line, edges embedded in each issue's `dependencies` array.
//! The whole file is read before parsing, so a snapshot reflects a single
//! read of the file even if an exporter rewrites it concurrently (exporters
//! replace the file atomically via rename).

use crate::config;
use crate::error::{ReadyError, Result};
use crate::model::{Issue, Snapshot};
use crate::storage::{IssueStore, WorkspaceRef};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Issue store backed by a JSONL file.
#[derive(Debug, Clone, Default)]
pub struct JsonlStore {
    path: Option<PathBuf>,
}

impl JsonlStore {
    /// Discover the export inside each workspace's `.beads` directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { path: None }
    }

    /// Always read this file, whatever the workspace.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn resolve(&self, workspace: &WorkspaceRef) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let beads_dir = config::discover_beads_dir(workspace.path())?;
        config::discover_jsonl(&beads_dir).ok_or(ReadyError::RepositoryNotFound { path: beads_dir })
    }
}

/// Parse JSONL content into issues.
///
/// # Errors
///
/// Returns `RepositoryCorrupt` naming the 1-based line that failed.
pub fn parse_issues(content: &str) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let issue: Issue = serde_json::from_str(line)
            .map_err(|e| ReadyError::corrupt(format!("line {line_no}: {e}")))?;
        if issue.id.trim().is_empty() {
            return Err(ReadyError::corrupt(format!("line {line_no}: issue has no id")));
        }
        issues.push(issue);
    }
    Ok(issues)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ReadyError::RepositoryNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::InvalidData => ReadyError::corrupt(format!("{}: {e}", path.display())),
        _ => ReadyError::unavailable(format!("{}: {e}", path.display())),
    })
}

impl IssueStore for JsonlStore {
    fn snapshot(&self, workspace: &WorkspaceRef) -> Result<Snapshot> {
        let path = self.resolve(workspace)?;
        debug!(path = %path.display(), "Reading JSONL export");
        let content = read_file(&path)?;
        let issues = parse_issues(&content)?;
        // Edges stay embedded; the graph builder lifts them out.
        Ok(Snapshot::new(issues, Vec::new()))
    }
}
