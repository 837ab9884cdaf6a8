//! Issue store adapters.
//!
//! An adapter answers one question: give me a consistent snapshot of all
//! issues and edges for this workspace. It never classifies and never writes.

mod jsonl;
mod memory;
mod sqlite;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::Snapshot;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifies the workspace a query is about (a project directory).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceRef {
    root: PathBuf,
}

impl WorkspaceRef {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl fmt::Display for WorkspaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

/// Read-only source of issue snapshots.
pub trait IssueStore: Send + Sync {
    /// Read every issue and dependency edge in one consistent pass.
    ///
    /// # Errors
    ///
    /// - `RepositoryNotFound` if nothing backs this workspace
    /// - `RepositoryUnavailable` if the store cannot be read right now
    /// - `RepositoryCorrupt` if rows violate the minimal schema
    fn snapshot(&self, workspace: &WorkspaceRef) -> Result<Snapshot>;
}

impl<T: IssueStore + ?Sized> IssueStore for Arc<T> {
    fn snapshot(&self, workspace: &WorkspaceRef) -> Result<Snapshot> {
        (**self).snapshot(workspace)
    }
}

impl<T: IssueStore + ?Sized> IssueStore for Box<T> {
    fn snapshot(&self, workspace: &WorkspaceRef) -> Result<Snapshot> {
        (**self).snapshot(workspace)
    }
}
