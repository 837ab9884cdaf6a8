//! In-process issue store.

use crate::error::{ReadyError, Result};
use crate::model::{Dependency, Issue, Snapshot, Status};
use crate::storage::{IssueStore, WorkspaceRef};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct Workspace {
    issues: Vec<Issue>,
    dependencies: Vec<Dependency>,
}

/// Issues held in memory, one set per workspace path.
///
/// Writers take the write lock for each mutation and `snapshot` clones under
/// the read lock, so a reader sees either all of a mutation or none of it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    workspaces: RwLock<HashMap<PathBuf, Workspace>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_workspace<R>(
        &self,
        workspace: &WorkspaceRef,
        f: impl FnOnce(&mut Workspace) -> R,
    ) -> Result<R> {
        let mut guard = self
            .workspaces
            .write()
            .map_err(|_| ReadyError::unavailable("memory store lock poisoned"))?;
        let entry = guard.entry(workspace.path().to_path_buf()).or_default();
        Ok(f(entry))
    }

    /// Register an empty workspace so it snapshots as zero issues.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryUnavailable` if the lock is poisoned.
    pub fn create_workspace(&self, workspace: &WorkspaceRef) -> Result<()> {
        self.with_workspace(workspace, |_| ())
    }

    /// Insert an issue, replacing any existing issue with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryUnavailable` if the lock is poisoned.
    pub fn put_issue(&self, workspace: &WorkspaceRef, issue: Issue) -> Result<()> {
        self.with_workspace(workspace, |ws| {
            if let Some(existing) = ws.issues.iter_mut().find(|i| i.id == issue.id) {
                *existing = issue;
            } else {
                ws.issues.push(issue);
            }
        })
    }

    /// Append an edge. Endpoints are not checked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryUnavailable` if the lock is poisoned.
    pub fn add_dependency(&self, workspace: &WorkspaceRef, dep: Dependency) -> Result<()> {
        self.with_workspace(workspace, |ws| ws.dependencies.push(dep))
    }

    /// Update an issue's status. Returns `false` if the issue does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryUnavailable` if the lock is poisoned.
    pub fn set_status(
        &self,
        workspace: &WorkspaceRef,
        id: &str,
        status: Option<Status>,
    ) -> Result<bool> {
        self.with_workspace(workspace, |ws| {
            ws.issues.iter_mut().find(|i| i.id == id).map_or(false, |issue| {
                issue.status = status;
                true
            })
        })
    }

    /// Drop a workspace entirely.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryUnavailable` if the lock is poisoned.
    pub fn remove_workspace(&self, workspace: &WorkspaceRef) -> Result<()> {
        let mut guard = self
            .workspaces
            .write()
            .map_err(|_| ReadyError::unavailable("memory store lock poisoned"))?;
        guard.remove(workspace.path());
        Ok(())
    }
}

impl IssueStore for MemoryStore {
    fn snapshot(&self, workspace: &WorkspaceRef) -> Result<Snapshot> {
        let guard = self
            .workspaces
            .read()
            .map_err(|_| ReadyError::unavailable("memory store lock poisoned"))?;
        let ws = guard
            .get(workspace.path())
            .ok_or_else(|| ReadyError::RepositoryNotFound {
                path: workspace.path().to_path_buf(),
            })?;
        Ok(Snapshot::new(ws.issues.clone(), ws.dependencies.clone()))
    }
}
