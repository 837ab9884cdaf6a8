//! Dependency graph assembly.
//!
//! Turns a [`Snapshot`] into an in-memory graph keyed by issue id. Each node
//! keeps its issue, the raw edges it declares, and the blocking edges that
//! survive validation in both directions.
//!
//! Edges that cannot be traversed are not errors:
//! - dangling (either endpoint missing) edges are kept aside and reported
//! - self-loops on blocking types are dropped and reported
//! - repeated blocking edges to the same target collapse into one
//!
//! Structural problems in the issues themselves (empty or duplicate ids) do
//! fail the build, since no classification of such a snapshot is trustworthy.

use crate::config::ReadinessConfig;
use crate::error::{ReadyError, Result};
use crate::model::{Dependency, DependencyType, Issue, Snapshot};
use crate::observe::{EventSink, ReadinessEvent};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// A blocking edge from a node to one of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingEdge {
    pub depends_on_id: String,
    pub dep_type: DependencyType,
}

/// One issue and its edges.
#[derive(Debug, Clone)]
pub struct Node {
    pub issue: Issue,
    /// Every edge the issue declares, in snapshot order, whatever its type.
    pub raw_dependencies: Vec<Dependency>,
    /// Validated blocking edges ("depends on").
    pub depends_on: Vec<BlockingEdge>,
    /// Ids of issues holding a validated blocking edge to this one.
    pub dependents: Vec<String>,
}

impl Node {
    fn new(issue: Issue) -> Self {
        Self {
            issue,
            raw_dependencies: Vec::new(),
            depends_on: Vec::new(),
            dependents: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.issue.id
    }
}

/// Data-quality findings made while building the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    DanglingDependency {
        issue_id: String,
        depends_on_id: String,
        dep_type: DependencyType,
    },
    SelfDependency {
        issue_id: String,
    },
}

impl GraphWarning {
    fn to_event(&self) -> ReadinessEvent {
        match self {
            Self::DanglingDependency {
                issue_id,
                depends_on_id,
                dep_type,
            } => ReadinessEvent::DanglingDependency {
                issue_id: issue_id.clone(),
                depends_on_id: depends_on_id.clone(),
                dep_type: dep_type.clone(),
            },
            Self::SelfDependency { issue_id } => ReadinessEvent::SelfDependency {
                issue_id: issue_id.clone(),
            },
        }
    }
}

/// Issues plus their blocking relations, in snapshot order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    dangling: Vec<Dependency>,
    warnings: Vec<GraphWarning>,
}

impl DependencyGraph {
    /// Build a graph from a snapshot.
    ///
    /// Edges come from `snapshot.dependencies` and from each issue's embedded
    /// `dependencies` (an embedded edge with an empty `issue_id` belongs to the
    /// issue carrying it). Identical edges reported by both sources count once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryCorrupt` if an issue has an empty id and
    /// `SchemaViolation` if two issues share an id.
    pub fn build(
        snapshot: Snapshot,
        config: &ReadinessConfig,
        sink: &dyn EventSink,
    ) -> Result<Self> {
        let Snapshot {
            issues,
            dependencies,
            ..
        } = snapshot;

        let mut graph = Self::default();
        let mut edges = dependencies;

        for (position, mut issue) in issues.into_iter().enumerate() {
            if issue.id.trim().is_empty() {
                return Err(ReadyError::corrupt(format!(
                    "issue at position {position} has no identifier"
                )));
            }
            if graph.index.contains_key(&issue.id) {
                return Err(ReadyError::SchemaViolation {
                    reason: format!("duplicate issue id '{}'", issue.id),
                });
            }

            for mut dep in std::mem::take(&mut issue.dependencies) {
                if dep.issue_id.is_empty() {
                    dep.issue_id.clone_from(&issue.id);
                }
                edges.push(dep);
            }

            graph.index.insert(issue.id.clone(), graph.nodes.len());
            graph.nodes.push(Node::new(issue));
        }

        let mut seen_raw: HashSet<(String, String, DependencyType)> = HashSet::new();
        let mut seen_blocking: HashSet<(String, String)> = HashSet::new();

        for dep in edges {
            let key = (
                dep.issue_id.clone(),
                dep.depends_on_id.clone(),
                dep.dep_type.clone(),
            );
            if !seen_raw.insert(key) {
                continue;
            }
            graph.add_edge(dep, config, sink, &mut seen_blocking);
        }

        trace!(
            nodes = graph.nodes.len(),
            dangling = graph.dangling.len(),
            warnings = graph.warnings.len(),
            "Built dependency graph"
        );

        Ok(graph)
    }

    fn add_edge(
        &mut self,
        dep: Dependency,
        config: &ReadinessConfig,
        sink: &dyn EventSink,
        seen_blocking: &mut HashSet<(String, String)>,
    ) {
        let Some(&source) = self.index.get(&dep.issue_id) else {
            self.record_dangling(dep, sink);
            return;
        };
        let target = self.index.get(&dep.depends_on_id).copied();
        let blocking = config.is_blocking(&dep.dep_type);

        if blocking && dep.issue_id == dep.depends_on_id {
            self.nodes[source].raw_dependencies.push(dep.clone());
            self.warn(
                GraphWarning::SelfDependency {
                    issue_id: dep.issue_id,
                },
                sink,
            );
            return;
        }

        let Some(target) = target else {
            self.nodes[source].raw_dependencies.push(dep.clone());
            self.record_dangling(dep, sink);
            return;
        };

        self.nodes[source].raw_dependencies.push(dep.clone());
        if !blocking {
            return;
        }

        if !seen_blocking.insert((dep.issue_id.clone(), dep.depends_on_id.clone())) {
            sink.record(&ReadinessEvent::DuplicateEdge {
                issue_id: dep.issue_id,
                depends_on_id: dep.depends_on_id,
            });
            return;
        }

        self.nodes[target].dependents.push(dep.issue_id.clone());
        self.nodes[source].depends_on.push(BlockingEdge {
            depends_on_id: dep.depends_on_id,
            dep_type: dep.dep_type,
        });
    }

    fn record_dangling(&mut self, dep: Dependency, sink: &dyn EventSink) {
        self.warn(
            GraphWarning::DanglingDependency {
                issue_id: dep.issue_id.clone(),
                depends_on_id: dep.depends_on_id.clone(),
                dep_type: dep.dep_type.clone(),
            },
            sink,
        );
        self.dangling.push(dep);
    }

    fn warn(&mut self, warning: GraphWarning, sink: &dyn EventSink) {
        sink.record(&warning.to_event());
        self.warnings.push(warning);
    }

    /// Look up a node by issue id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Nodes in snapshot order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges with an endpoint outside the snapshot.
    #[must_use]
    pub fn dangling(&self) -> &[Dependency] {
        &self.dangling
    }

    #[must_use]
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }
}
