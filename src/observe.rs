//! Structured event sink.
//!
//! Components report what they observe through an [`EventSink`] handed to
//! them by the caller instead of reaching for process-wide state. The default
//! [`TracingSink`] forwards every event to `tracing`; [`RecordingSink`] keeps
//! them in memory so tests can assert on warnings.

use crate::model::DependencyType;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Something worth reporting while answering a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessEvent {
    /// A snapshot was read from the store.
    SnapshotTaken { issues: usize, dependencies: usize },
    /// An edge points at an issue id absent from the snapshot.
    DanglingDependency {
        issue_id: String,
        depends_on_id: String,
        dep_type: DependencyType,
    },
    /// An issue lists itself as a blocking dependency.
    SelfDependency { issue_id: String },
    /// The same blocking edge appears more than once.
    DuplicateEdge {
        issue_id: String,
        depends_on_id: String,
    },
    /// Classification finished.
    Classified {
        done: usize,
        in_progress: usize,
        blocked: usize,
        ready: usize,
    },
}

impl ReadinessEvent {
    /// Data-quality events are warnings; everything else is informational.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::DanglingDependency { .. } | Self::SelfDependency { .. } | Self::DuplicateEdge { .. }
        )
    }
}

/// Receiver for [`ReadinessEvent`]s.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ReadinessEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ReadinessEvent) {
        match event {
            ReadinessEvent::SnapshotTaken {
                issues,
                dependencies,
            } => debug!(issues, dependencies, "Snapshot taken"),
            ReadinessEvent::DanglingDependency {
                issue_id,
                depends_on_id,
                dep_type,
            } => warn!(
                issue_id = %issue_id,
                depends_on_id = %depends_on_id,
                dep_type = %dep_type,
                "Dangling dependency ignored"
            ),
            ReadinessEvent::SelfDependency { issue_id } => {
                warn!(issue_id = %issue_id, "Self dependency ignored");
            }
            ReadinessEvent::DuplicateEdge {
                issue_id,
                depends_on_id,
            } => debug!(
                issue_id = %issue_id,
                depends_on_id = %depends_on_id,
                "Duplicate blocking edge collapsed"
            ),
            ReadinessEvent::Classified {
                done,
                in_progress,
                blocked,
                ready,
            } => debug!(done, in_progress, blocked, ready, "Classified issues"),
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ReadinessEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<ReadinessEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<ReadinessEvent> {
        self.events()
            .into_iter()
            .filter(ReadinessEvent::is_warning)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &ReadinessEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
