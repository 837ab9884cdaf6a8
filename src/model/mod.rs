//! Core data types for `beads_ready`.
//!
//! This module defines the records read from an issue store:
//! - `Issue` - The core work item
//! - `Status` - Stored lifecycle status (as written by the tracker)
//! - `IssueType` - Categories of issues
//! - `DependencyType` - Typed relation between two issues
//! - `Dependency` - A directed edge (dependent -> depends-on)
//! - `Snapshot` - One consistent read of all issues and edges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Stored issue status.
///
/// Trackers disagree on spelling, so parsing is lenient and anything
/// unrecognised is kept verbatim as `Custom`. Deserialization goes through
/// the same lenient parser as the SQLite reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Status {
    Open,
    Ready,
    Todo,
    InProgress,
    Blocked,
    Deferred,
    Completed,
    Closed,
    Tombstone,
    #[serde(untagged)]
    Custom(String),
}

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Ready => "ready",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Deferred => "deferred",
            Self::Completed => "completed",
            Self::Closed => "closed",
            Self::Tombstone => "tombstone",
            Self::Custom(value) => value,
        }
    }

    /// `completed`, `closed` and `tombstone` all mean the work is finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Completed | Self::Closed | Self::Tombstone)
    }

    /// Statuses that may become `ready` once their blockers are done.
    ///
    /// `blocked`, `deferred` and custom statuses are held by the tracker
    /// itself and never surface as ready work.
    #[must_use]
    pub const fn is_not_started(&self) -> bool {
        matches!(self, Self::Open | Self::Ready | Self::Todo)
    }

    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Parse a stored status string. Never fails.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "open" => Self::Open,
            "ready" => Self::Ready,
            "todo" => Self::Todo,
            "in_progress" | "inprogress" | "in-progress" => Self::InProgress,
            "blocked" => Self::Blocked,
            "deferred" => Self::Deferred,
            "completed" => Self::Completed,
            "closed" => Self::Closed,
            "tombstone" => Self::Tombstone,
            _ => Self::Custom(value.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

/// Issue priority (0=Critical, 4=Backlog). Lower sorts first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const CRITICAL: Self = Self(0);
    pub const HIGH: Self = Self(1);
    pub const MEDIUM: Self = Self(2);
    pub const LOW: Self = Self(3);
    pub const BACKLOG: Self = Self(4);
}

impl Default for Priority {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Issue type category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum IssueType {
    #[default]
    Task,
    Bug,
    Feature,
    Epic,
    Chore,
    Docs,
    Question,
    #[serde(untagged)]
    Custom(String),
}

impl IssueType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Epic => "epic",
            Self::Chore => "chore",
            Self::Docs => "docs",
            Self::Question => "question",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "task" => Self::Task,
            "bug" => Self::Bug,
            "feature" => Self::Feature,
            "epic" => Self::Epic,
            "chore" => Self::Chore,
            "docs" => Self::Docs,
            "question" => Self::Question,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl From<String> for IssueType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(issue_type) => issue_type,
            Err(never) => match never {},
        }
    }
}

/// Dependency relationship type.
///
/// Only the configured blocking subset participates in readiness; the rest
/// are informational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum DependencyType {
    #[default]
    Blocks,
    ParentChild,
    ConditionalBlocks,
    WaitsFor,
    Related,
    DiscoveredFrom,
    #[serde(untagged)]
    Custom(String),
}

impl DependencyType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Blocks => "blocks",
            Self::ParentChild => "parent-child",
            Self::ConditionalBlocks => "conditional-blocks",
            Self::WaitsFor => "waits-for",
            Self::Related => "related",
            Self::DiscoveredFrom => "discovered-from",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().replace('_', "-").as_str() {
            "blocks" => Self::Blocks,
            "parent-child" | "parent" => Self::ParentChild,
            "conditional-blocks" => Self::ConditionalBlocks,
            "waits-for" => Self::WaitsFor,
            "related" => Self::Related,
            "discovered-from" => Self::DiscoveredFrom,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl From<String> for DependencyType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(dep_type) => dep_type,
            Err(never) => match never {},
        }
    }
}

/// Exports written by older trackers carry `"priority": null`.
fn nullable_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Priority>::deserialize(deserializer)?.unwrap_or_default())
}

/// The primary issue entity.
///
/// Only `id`, `status` and `priority` drive classification; every other field
/// is carried through to the views untouched. Attributes the store has but
/// this type does not name land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    /// Unique ID (e.g., "bd-abc123").
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Workflow status; `None` means never set.
    #[serde(default)]
    pub status: Option<Status>,

    #[serde(default, deserialize_with = "nullable_priority")]
    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    #[serde(default)]
    pub issue_type: IssueType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Technical design notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,

    /// External reference (e.g., JIRA-123).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<String>,

    /// Embedded edges (JSONL exports only; SQLite keeps them in a table).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    /// Opaque attributes carried for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Issue {
    /// A bare open issue with the given id and title.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: Some(Status::Open),
            priority: Priority::default(),
            assignee: None,
            issue_type: IssueType::default(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            notes: None,
            design: None,
            external_ref: None,
            acceptance_criteria: None,
            approval: None,
            epic_id: None,
            dependencies: vec![],
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status.as_ref().is_some_and(Status::is_done)
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status.as_ref().is_some_and(Status::is_in_progress)
    }

    /// An unset status counts as not started.
    #[must_use]
    pub fn is_not_started(&self) -> bool {
        self.status.as_ref().is_none_or(Status::is_not_started)
    }

    /// Status as written, or `None` when unset.
    #[must_use]
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().map(Status::as_str)
    }
}

/// Relationship between two issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    /// The issue that has the dependency (source).
    #[serde(default)]
    pub issue_id: String,

    /// The issue being depended on (target).
    pub depends_on_id: String,

    #[serde(rename = "type", default)]
    pub dep_type: DependencyType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Dependency {
    #[must_use]
    pub fn new(
        issue_id: impl Into<String>,
        depends_on_id: impl Into<String>,
        dep_type: DependencyType,
    ) -> Self {
        Self {
            issue_id: issue_id.into(),
            depends_on_id: depends_on_id.into(),
            dep_type,
            created_at: None,
            created_by: None,
        }
    }
}

/// One consistent, point-in-time read of an issue store.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub issues: Vec<Issue>,
    pub dependencies: Vec<Dependency>,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    #[must_use]
    pub fn new(issues: Vec<Issue>, dependencies: Vec<Dependency>) -> Self {
        Self {
            issues,
            dependencies,
            taken_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![], vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_custom_roundtrip() {
        let status: Status = serde_json::from_str("\"custom_status\"").unwrap();
        assert_eq!(status, Status::Custom("custom_status".to_string()));
        let serialized = serde_json::to_string(&status).unwrap();
        assert_eq!(serialized, "\"custom_status\"");
    }

    #[test]
    fn status_done_and_in_progress() {
        assert!(Status::Completed.is_done());
        assert!(Status::Closed.is_done());
        assert!(Status::Tombstone.is_done());
        assert!(!Status::Open.is_done());
        assert!(!Status::Custom("done".to_string()).is_done());
        assert!(Status::InProgress.is_in_progress());
        assert!(!Status::Ready.is_in_progress());
    }

    #[test]
    fn status_parse_is_lenient() {
        assert_eq!(Status::parse_lenient("IN_PROGRESS"), Status::InProgress);
        assert_eq!(Status::parse_lenient("in-progress"), Status::InProgress);
        assert_eq!(Status::parse_lenient("Todo"), Status::Todo);
        assert_eq!(
            Status::parse_lenient("review"),
            Status::Custom("review".to_string())
        );
    }

    #[test]
    fn deserialize_uses_lenient_parsing() {
        let status: Status = serde_json::from_str("\"Closed\"").unwrap();
        assert_eq!(status, Status::Closed);
        let status: Status = serde_json::from_str("\"IN-PROGRESS\"").unwrap();
        assert_eq!(status, Status::InProgress);
        let status: Status = serde_json::from_str("\"tombstone\"").unwrap();
        assert!(status.is_done());

        let dep: Dependency =
            serde_json::from_str(r#"{"depends_on_id": "bd-2", "type": "Blocks"}"#).unwrap();
        assert_eq!(dep.dep_type, DependencyType::Blocks);
        let dep: Dependency =
            serde_json::from_str(r#"{"depends_on_id": "bd-2", "type": "parent_child"}"#).unwrap();
        assert_eq!(dep.dep_type, DependencyType::ParentChild);

        let issue_type: IssueType = serde_json::from_str("\"Bug\"").unwrap();
        assert_eq!(issue_type, IssueType::Bug);
    }

    #[test]
    fn held_statuses_are_not_started_only_when_workable() {
        assert!(Status::Open.is_not_started());
        assert!(Status::Todo.is_not_started());
        assert!(!Status::Blocked.is_not_started());
        assert!(!Status::Deferred.is_not_started());
        assert!(!Status::Custom("triage".to_string()).is_not_started());

        let mut issue = Issue::new("bd-1", "Unset");
        issue.status = None;
        assert!(issue.is_not_started());
    }

    #[test]
    fn null_priority_defaults_to_medium() {
        let issue: Issue =
            serde_json::from_str(r#"{"id": "bd-1", "priority": null}"#).unwrap();
        assert_eq!(issue.priority, Priority::MEDIUM);
        let issue: Issue = serde_json::from_str(r#"{"id": "bd-2", "priority": 0}"#).unwrap();
        assert_eq!(issue.priority, Priority::CRITICAL);
    }

    #[test]
    fn dependency_type_parse_aliases() {
        assert_eq!(
            "parent".parse::<DependencyType>().unwrap(),
            DependencyType::ParentChild
        );
        assert_eq!(
            "discovered_from".parse::<DependencyType>().unwrap(),
            DependencyType::DiscoveredFrom
        );
        assert_eq!(
            "mentions".parse::<DependencyType>().unwrap(),
            DependencyType::Custom("mentions".to_string())
        );
    }

    #[test]
    fn issue_deserialize_defaults_missing_fields() {
        let json = r#"{"id": "bd-123"}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.title, "");
        assert!(issue.status.is_none());
        assert_eq!(issue.priority, Priority::MEDIUM);
        assert!(issue.dependencies.is_empty());
        assert!(issue.extra.is_empty());
    }

    #[test]
    fn issue_keeps_unknown_fields_in_extra() {
        let json = r#"{
            "id": "bd-1",
            "title": "Extra",
            "status": "open",
            "estimated_minutes": 30,
            "labels": ["backend"]
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.extra.get("estimated_minutes"), Some(&serde_json::json!(30)));
        assert_eq!(issue.extra.get("labels"), Some(&serde_json::json!(["backend"])));

        let back = serde_json::to_value(&issue).unwrap();
        assert_eq!(back["estimated_minutes"], 30);
    }

    #[test]
    fn test_dependency_type_serialization() {
        let json = serde_json::to_string(&DependencyType::ParentChild).unwrap();
        assert_eq!(json, "\"parent-child\"");

        let dep: Dependency =
            serde_json::from_str(r#"{"depends_on_id": "bd-2", "type": "related"}"#).unwrap();
        assert_eq!(dep.dep_type, DependencyType::Related);
        assert_eq!(dep.issue_id, "");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::CRITICAL < Priority::BACKLOG);
        assert_eq!(Priority::HIGH.to_string(), "P1");
        assert_eq!(serde_json::to_string(&Priority(0)).unwrap(), "0");
    }
}
