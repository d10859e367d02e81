//! Mutable playthrough state, owned by the traversal engine.

use lifeline_core::id::NodeId;
use serde::Serialize;

use super::statistics::PlayStats;

/// Where the traversal state machine currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalPhase {
    /// A prompt of the current node is on screen.
    ShowingPrompt,
    /// The choices of the current node are on offer.
    AwaitingChoice,
    /// A target has been resolved and must now be entered.
    EnteringNode(NodeId),
    /// The clear node has been reached.
    Terminal,
}

/// The per-session position and statistics.
///
/// Only the traversal engine mutates it; the presentation layer reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaythroughState {
    pub(crate) current_node_id: NodeId,
    pub(crate) current_prompt_index: usize,
    pub(crate) stats: PlayStats,
    pub(crate) phase: TraversalPhase,
    /// Whether the statistics checkpoint already ran for this node visit.
    #[serde(skip)]
    pub(crate) checkpointed: bool,
}

impl PlaythroughState {
    pub(crate) fn new(start: NodeId) -> Self {
        Self {
            current_node_id: start,
            current_prompt_index: 0,
            stats: PlayStats::default(),
            phase: TraversalPhase::ShowingPrompt,
            checkpointed: false,
        }
    }

    /// The node being played.
    #[must_use]
    pub fn current_node_id(&self) -> &NodeId {
        &self.current_node_id
    }

    /// Index of the prompt being shown within the current node.
    #[must_use]
    pub fn current_prompt_index(&self) -> usize {
        self.current_prompt_index
    }

    /// Accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> PlayStats {
        self.stats
    }

    /// Current state-machine phase.
    #[must_use]
    pub fn phase(&self) -> &TraversalPhase {
        &self.phase
    }

    /// Whether choices are on offer right now.
    #[must_use]
    pub fn is_awaiting_choice(&self) -> bool {
        self.phase == TraversalPhase::AwaitingChoice
    }

    /// Whether the clear node has been reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase == TraversalPhase::Terminal
    }
}
