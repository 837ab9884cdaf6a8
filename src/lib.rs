//! `beads_ready` - dependency-aware readiness for beads issue stores.
//!
//! Reads a snapshot of issues and typed dependency edges, labels every issue
//! `done`, `in_progress`, `blocked` or `ready`, and answers three queries:
//! a status summary, the full task list, and the ready list.
//!
//! ```no_run
//! use beads_ready::{ReadinessQueries, SqliteStore, WorkspaceRef};
//!
//! let queries = ReadinessQueries::new(SqliteStore::new());
//! let ready = queries.ready_tasks(&WorkspaceRef::new("."))?;
//! # Ok::<(), beads_ready::ReadyError>(())
//! ```

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod graph;
pub mod logging;
pub mod model;
pub mod observe;
pub mod query;
pub mod storage;

pub use aggregate::{DependencyRef, ReadyTask, StatusSummary, TaskView};
pub use classify::{Classification, Label};
pub use config::ReadinessConfig;
pub use error::{ErrorCode, ReadyError, Result, StructuredError};
pub use graph::{DependencyGraph, GraphWarning};
pub use observe::{EventSink, ReadinessEvent, RecordingSink, TracingSink};
pub use query::ReadinessQueries;
pub use storage::{IssueStore, JsonlStore, MemoryStore, SqliteStore, WorkspaceRef};
