//! Static checks over a loaded story graph.
//!
//! Nothing here stops a playthrough on its own: at runtime the traversal
//! engine degrades absent and malformed nodes to the clear node. The report
//! tells the author (and the logs) where that will happen.

use lifeline_core::error::StoryError;
use lifeline_core::id::NodeId;
use serde::Serialize;

use crate::domain::graph::StoryGraph;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Playable, but a branch will silently fall back to the clear node.
    Warning,
    /// A required node is missing.
    Error,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphIssue {
    /// How serious it is.
    pub severity: Severity,
    /// The node the issue is about.
    pub node_id: NodeId,
    /// Description.
    pub message: String,
}

/// All findings for a graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Findings, errors first.
    pub issues: Vec<GraphIssue>,
}

impl ValidationReport {
    /// Converts the first error into a `StoryError`, passing warnings through.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Graph` naming the first missing required node.
    pub fn into_result(self) -> Result<Vec<GraphIssue>, StoryError> {
        match self.issues.iter().find(|i| i.severity == Severity::Error) {
            Some(issue) => Err(StoryError::Graph(issue.node_id.clone())),
            None => Ok(self.issues),
        }
    }
}

const MISSING: &str = "required node is missing";

/// Checks `graph`, treating every id in `required` as a node that must exist
/// (start, clear and end nodes). The clear node is terminal, so it may be
/// declared without prompts or choices.
#[must_use]
pub fn validate_graph(
    graph: &StoryGraph,
    clear_node_id: &NodeId,
    required: &[&NodeId],
) -> ValidationReport {
    let mut issues = Vec::new();

    for id in required {
        if !graph.contains(id.as_str()) {
            issues.push(GraphIssue {
                severity: Severity::Error,
                node_id: (*id).clone(),
                message: MISSING.to_owned(),
            });
        }
    }

    let mut nodes: Vec<_> = graph.nodes().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    for node in nodes {
        let checked = if node.id == *clear_node_id {
            Ok(())
        } else {
            node.check()
        };
        if let Err(err) = checked {
            issues.push(GraphIssue {
                severity: Severity::Warning,
                node_id: node.id.clone(),
                message: err.to_string(),
            });
        }
        for target in node.outgoing() {
            if !graph.contains(target.as_str()) {
                issues.push(GraphIssue {
                    severity: Severity::Warning,
                    node_id: node.id.clone(),
                    message: format!("links to missing node `{target}`"),
                });
            }
        }
    }

    issues.sort_by(|a, b| b.severity.cmp(&a.severity));
    ValidationReport { issues }
}
