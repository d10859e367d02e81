//! Events the traversal engine hands to the presentation layer.

use lifeline_core::id::NodeId;
use lifeline_story::domain::graph::Choice;
use serde::Serialize;

/// What the presentation layer should do next. Each event supersedes the
/// previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraversalEvent {
    /// Render prompt `prompt_index` of `node_id`.
    ShowPrompt {
        /// Node being played.
        node_id: NodeId,
        /// Prompt to render.
        prompt_index: usize,
    },
    /// Offer these choices and wait for a selection.
    AwaitChoice {
        /// Choice node being played.
        node_id: NodeId,
        /// Options in display order.
        choices: Vec<Choice>,
    },
    /// The story moves on to `node_id`; call `enter_node` with it.
    EnterNode {
        /// Resolved target.
        node_id: NodeId,
    },
    /// The clear node has played out; show the final screen.
    TerminalReached {
        /// The clear node.
        node_id: NodeId,
    },
}

impl TraversalEvent {
    /// Returns the event type name (for logging/routing).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ShowPrompt { .. } => "traversal.show_prompt",
            Self::AwaitChoice { .. } => "traversal.await_choice",
            Self::EnterNode { .. } => "traversal.enter_node",
            Self::TerminalReached { .. } => "traversal.terminal_reached",
        }
    }
}

/// The outcome of entering a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    /// What to render.
    pub event: TraversalEvent,
    /// The caller must stop the countdown: terminal arrival always halts
    /// survival timing.
    pub stop_countdown: bool,
    /// The requested node was absent or malformed and the clear node was
    /// entered instead.
    pub substituted: bool,
}
