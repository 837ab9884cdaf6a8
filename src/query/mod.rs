//! Query facade.
//!
//! [`ReadinessQueries`] is the external contract: status summary, all tasks,
//! ready tasks. Each call reads a fresh snapshot, rebuilds the graph and
//! reclassifies; nothing is cached between calls, so concurrent callers never
//! share mutable state.

use crate::aggregate::{self, ReadyTask, StatusSummary, TaskView};
use crate::classify::{self, Classifications};
use crate::config::ReadinessConfig;
use crate::error::{ReadyError, Result};
use crate::graph::DependencyGraph;
use crate::model::Snapshot;
use crate::observe::{EventSink, ReadinessEvent, TracingSink};
use crate::storage::{IssueStore, WorkspaceRef};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, instrument};

/// Readiness queries over an issue store.
pub struct ReadinessQueries<S: IssueStore + ?Sized + 'static> {
    store: Arc<S>,
    config: ReadinessConfig,
    sink: Arc<dyn EventSink>,
    deadline: Option<Duration>,
}

impl<S: IssueStore + 'static> ReadinessQueries<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }
}

impl<S: IssueStore + ?Sized + 'static> ReadinessQueries<S> {
    /// Share an existing store (including `Arc<dyn IssueStore>`).
    #[must_use]
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            config: ReadinessConfig::default(),
            sink: Arc::new(TracingSink),
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ReadinessConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Give up on snapshot acquisition after `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Counts by label: `total`, `ready`, `in_progress`, `completed`.
    ///
    /// # Errors
    ///
    /// Propagates repository errors; no partial summary is ever returned.
    #[instrument(skip_all, fields(workspace = %workspace))]
    pub fn status_summary(&self, workspace: &WorkspaceRef) -> Result<StatusSummary> {
        let (_, classes) = self.evaluate(workspace)?;
        Ok(aggregate::status_summary(&classes))
    }

    /// Every issue with its computed label and raw dependency list.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    #[instrument(skip_all, fields(workspace = %workspace))]
    pub fn all_tasks(&self, workspace: &WorkspaceRef) -> Result<Vec<TaskView>> {
        let (graph, classes) = self.evaluate(workspace)?;
        Ok(aggregate::all_tasks(&graph, &classes))
    }

    /// Issues that can be started now.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    #[instrument(skip_all, fields(workspace = %workspace))]
    pub fn ready_tasks(&self, workspace: &WorkspaceRef) -> Result<Vec<ReadyTask>> {
        let (graph, classes) = self.evaluate(workspace)?;
        Ok(aggregate::ready_tasks(&graph, &classes))
    }

    fn evaluate(&self, workspace: &WorkspaceRef) -> Result<(DependencyGraph, Classifications)> {
        let snapshot = self.acquire(workspace)?;
        let embedded: usize = snapshot.issues.iter().map(|i| i.dependencies.len()).sum();
        self.sink.record(&ReadinessEvent::SnapshotTaken {
            issues: snapshot.issues.len(),
            dependencies: snapshot.dependencies.len() + embedded,
        });

        let graph = DependencyGraph::build(snapshot, &self.config, self.sink.as_ref())?;
        let classes = classify::classify(&graph);

        let counts = classes.counts();
        self.sink.record(&ReadinessEvent::Classified {
            done: counts.done,
            in_progress: counts.in_progress,
            blocked: counts.blocked,
            ready: counts.ready,
        });
        Ok((graph, classes))
    }

    fn acquire(&self, workspace: &WorkspaceRef) -> Result<Snapshot> {
        let Some(deadline) = self.deadline else {
            return self.store.snapshot(workspace);
        };

        let (tx, rx) = mpsc::channel();
        let store = Arc::clone(&self.store);
        let workspace = workspace.clone();
        thread::Builder::new()
            .name("bready-snapshot".to_string())
            .spawn(move || {
                // The receiver is gone if the deadline already passed.
                let _ = tx.send(store.snapshot(&workspace));
            })?;

        match rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                let waited_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                debug!(waited_ms, "Abandoning snapshot acquisition");
                Err(ReadyError::DeadlineExceeded { waited_ms })
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(ReadyError::unavailable("snapshot worker exited without a result"))
            }
        }
    }
}
