//! Story error types.

use thiserror::Error;

use crate::id::NodeId;

/// Top-level error type shared by the story, traversal and session crates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoryError {
    /// A referenced node is absent and no fallback exists (start node, or the
    /// clear node itself). Fatal for the session.
    #[error("graph error: node `{0}` is not in the story graph")]
    Graph(NodeId),

    /// A choice selection fell outside the pending choice list.
    #[error("choice index {index} out of range: {available} choice(s) available")]
    ChoiceIndex {
        /// The requested index.
        index: usize,
        /// How many choices were actually on offer.
        available: usize,
    },

    /// A node lacks what its declared kind requires.
    #[error("malformed node `{node_id}`: {reason}")]
    MalformedNode {
        /// The offending node.
        node_id: NodeId,
        /// What is missing.
        reason: String,
    },

    /// Story text could not be read or parsed.
    #[error("load error: {0}")]
    Load(String),

    /// Invalid configuration.
    #[error("validation error: {0}")]
    Validation(String),
}

impl StoryError {
    /// Whether the session can carry on after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ChoiceIndex { .. } | Self::MalformedNode { .. })
    }
}
