//! Views derived from a classified graph.
//!
//! Three projections: a count summary, the full task listing, and the ready
//! listing. All ordering decisions live here.

use crate::classify::{Classifications, Label};
use crate::graph::{DependencyGraph, Node};
use crate::model::{DependencyType, IssueType, Priority, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Issue counts by label.
///
/// `completed` counts `done` issues. Blocked issues appear only in `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub ready: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// A raw edge as listed on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub depends_on_id: String,
    #[serde(rename = "type")]
    pub dep_type: DependencyType,
}

/// One issue with its computed label, as returned by the all-tasks listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Priority,
    pub assignee: Option<String>,
    pub issue_type: IssueType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub design: Option<String>,
    pub external_ref: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub approval: Option<String>,
    pub epic_id: Option<String>,
    pub dependencies: Vec<DependencyRef>,
    pub computed_label: Label,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Reduced projection for the ready listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyTask {
    pub id: String,
    pub title: String,
    pub status: Option<Status>,
    pub priority: Priority,
}

#[must_use]
pub fn status_summary(classes: &Classifications) -> StatusSummary {
    let counts = classes.counts();
    StatusSummary {
        total: counts.total(),
        ready: counts.ready,
        in_progress: counts.in_progress,
        completed: counts.done,
    }
}

fn task_view(node: &Node, classes: &Classifications) -> TaskView {
    let issue = &node.issue;
    let (computed_label, blocked_by) = classes.get(&issue.id).map_or_else(
        || (Label::Ready, Vec::new()),
        |c| (c.label, c.blocked_by.clone()),
    );

    TaskView {
        id: issue.id.clone(),
        title: issue.title.clone(),
        description: issue.description.clone(),
        status: issue.status.clone(),
        priority: issue.priority,
        assignee: issue.assignee.clone(),
        issue_type: issue.issue_type.clone(),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        notes: issue.notes.clone(),
        design: issue.design.clone(),
        external_ref: issue.external_ref.clone(),
        acceptance_criteria: issue.acceptance_criteria.clone(),
        approval: issue.approval.clone(),
        epic_id: issue.epic_id.clone(),
        dependencies: node
            .raw_dependencies
            .iter()
            .map(|dep| DependencyRef {
                depends_on_id: dep.depends_on_id.clone(),
                dep_type: dep.dep_type.clone(),
            })
            .collect(),
        computed_label,
        blocked_by,
        extra: issue.extra.clone(),
    }
}

/// Priority ascending, then newest first (unknown creation time last), then id.
fn all_tasks_order(a: &TaskView, b: &TaskView) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Every issue with its label and raw edges.
#[must_use]
pub fn all_tasks(graph: &DependencyGraph, classes: &Classifications) -> Vec<TaskView> {
    let mut tasks: Vec<TaskView> = graph.nodes().map(|n| task_view(n, classes)).collect();
    tasks.sort_by(all_tasks_order);
    tasks
}

/// Issues labeled `ready`, by priority then id.
#[must_use]
pub fn ready_tasks(graph: &DependencyGraph, classes: &Classifications) -> Vec<ReadyTask> {
    let mut ready: Vec<ReadyTask> = graph
        .nodes()
        .filter(|n| classes.label_of(n.id()) == Some(Label::Ready))
        .map(|n| ReadyTask {
            id: n.issue.id.clone(),
            title: n.issue.title.clone(),
            status: n.issue.status.clone(),
            priority: n.issue.priority,
        })
        .collect();
    ready.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
    ready
}
