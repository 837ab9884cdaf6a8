//! Issue and dependency builders shared by the integration tests.

use beads_ready::model::{Dependency, DependencyType, Issue, Priority, Status};
use beads_ready::{MemoryStore, WorkspaceRef};
use chrono::{DateTime, TimeZone, Utc};

pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            issue: Issue::new(id, format!("Issue {id}")),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.issue.title = title.to_string();
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.issue.status = Some(status);
        self
    }

    pub fn no_status(mut self) -> Self {
        self.issue.status = None;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.issue.priority = Priority(priority);
        self
    }

    /// Creation time as days after 2025-01-01.
    pub fn created_day(mut self, day: u32) -> Self {
        self.issue.created_at = Some(day_ts(day));
        self
    }

    pub fn build(self) -> Issue {
        self.issue
    }
}

pub fn issue(id: &str) -> IssueBuilder {
    IssueBuilder::new(id)
}

pub fn day_ts(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(i64::from(day))
}

pub fn blocks(from: &str, to: &str) -> Dependency {
    Dependency::new(from, to, DependencyType::Blocks)
}

pub fn related(from: &str, to: &str) -> Dependency {
    Dependency::new(from, to, DependencyType::Related)
}

/// A memory store holding one workspace.
pub fn memory_workspace(issues: Vec<Issue>, deps: Vec<Dependency>) -> (MemoryStore, WorkspaceRef) {
    let store = MemoryStore::new();
    let ws = WorkspaceRef::new("/memory/ws");
    store.create_workspace(&ws).unwrap();
    for issue in issues {
        store.put_issue(&ws, issue).unwrap();
    }
    for dep in deps {
        store.add_dependency(&ws, dep).unwrap();
    }
    (store, ws)
}
