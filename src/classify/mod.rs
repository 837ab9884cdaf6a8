//! Readiness classification.
//!
//! Every node gets exactly one [`Label`]. The decision for a node looks only
//! at its own stored status and at the stored status of its direct blocking
//! dependencies, so there is no recursion and cycles cannot loop. Two
//! not-started issues blocking each other both come out `blocked`.
//!
//! A stored status of `blocked`, `deferred` or anything unrecognised holds
//! the issue regardless of its dependencies. It is labeled `blocked` and
//! `blocked_by` lists whatever unfinished blockers it also has, possibly
//! none.

use crate::graph::{DependencyGraph, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Derived readiness label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Done,
    InProgress,
    Blocked,
    Ready,
}

impl Label {
    pub const ALL: [Self; 4] = [Self::Done, Self::InProgress, Self::Blocked, Self::Ready];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "done" => Ok(Self::Done),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "ready" => Ok(Self::Ready),
            other => Err(format!(
                "unknown label '{other}' (expected done, in_progress, blocked or ready)"
            )),
        }
    }
}

/// Label for one issue, plus the unresolved blockers when `blocked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub label: Label,
    pub blocked_by: Vec<String>,
}

impl Classification {
    const fn plain(label: Label) -> Self {
        Self {
            label,
            blocked_by: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub done: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub ready: usize,
}

impl LabelCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.done + self.in_progress + self.blocked + self.ready
    }

    #[must_use]
    pub const fn get(&self, label: Label) -> usize {
        match label {
            Label::Done => self.done,
            Label::InProgress => self.in_progress,
            Label::Blocked => self.blocked,
            Label::Ready => self.ready,
        }
    }

    fn bump(&mut self, label: Label) {
        match label {
            Label::Done => self.done += 1,
            Label::InProgress => self.in_progress += 1,
            Label::Blocked => self.blocked += 1,
            Label::Ready => self.ready += 1,
        }
    }
}

/// Classification of a whole graph.
#[derive(Debug, Clone, Default)]
pub struct Classifications {
    by_id: HashMap<String, Classification>,
    counts: LabelCounts,
}

impl Classifications {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Classification> {
        self.by_id.get(id)
    }

    #[must_use]
    pub fn label_of(&self, id: &str) -> Option<Label> {
        self.by_id.get(id).map(|c| c.label)
    }

    #[must_use]
    pub const fn counts(&self) -> LabelCounts {
        self.counts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Label a single node against the rest of the graph.
#[must_use]
pub fn classify_node(graph: &DependencyGraph, node: &Node) -> Classification {
    if node.issue.is_done() {
        return Classification::plain(Label::Done);
    }
    if node.issue.is_in_progress() {
        return Classification::plain(Label::InProgress);
    }

    // Edges in the graph are already validated, so a missing target can only
    // mean the graph was mutated externally; treat it like a dangling edge.
    let blocked_by: Vec<String> = node
        .depends_on
        .iter()
        .filter(|edge| {
            graph
                .node(&edge.depends_on_id)
                .is_some_and(|target| !target.issue.is_done())
        })
        .map(|edge| edge.depends_on_id.clone())
        .collect();

    if blocked_by.is_empty() && node.issue.is_not_started() {
        Classification::plain(Label::Ready)
    } else {
        Classification {
            label: Label::Blocked,
            blocked_by,
        }
    }
}

/// Label every node in one pass.
#[must_use]
pub fn classify(graph: &DependencyGraph) -> Classifications {
    let mut result = Classifications {
        by_id: HashMap::with_capacity(graph.len()),
        counts: LabelCounts::default(),
    };

    for node in graph.nodes() {
        let classification = classify_node(graph, node);
        result.counts.bump(classification.label);
        result.by_id.insert(node.id().to_string(), classification);
    }

    result
}
