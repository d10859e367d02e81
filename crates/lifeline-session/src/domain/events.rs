//! Events pushed to the presentation layer, one at a time, in order.

use lifeline_core::id::NodeId;
use lifeline_story::domain::graph::Choice;
use lifeline_traversal::domain::events::TraversalEvent;
use serde::Serialize;

/// Everything a presentation adapter has to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Render prompt `prompt_index` of `node_id`.
    ShowPrompt {
        /// Node being played.
        node_id: NodeId,
        /// Prompt to render.
        prompt_index: usize,
    },
    /// Offer these choices.
    AwaitChoice {
        /// Choice node being played.
        node_id: NodeId,
        /// Options in display order.
        choices: Vec<Choice>,
    },
    /// The story is moving to `node_id`.
    EnterNode {
        /// Node being entered.
        node_id: NodeId,
    },
    /// The story is over; show the final screen.
    TerminalReached {
        /// The clear node.
        node_id: NodeId,
    },
    /// One second of survival time elapsed.
    CountdownTick {
        /// Seconds left.
        remaining_seconds: u32,
        /// The session's limit.
        limit_seconds: u32,
    },
    /// Survival time ran out; the forced ending follows.
    CountdownExpired,
    /// The story cannot be played.
    StoryUnavailable {
        /// What went wrong.
        reason: String,
    },
}

impl SessionEvent {
    /// Returns the event type name (for logging/routing).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ShowPrompt { .. } => "session.show_prompt",
            Self::AwaitChoice { .. } => "session.await_choice",
            Self::EnterNode { .. } => "session.enter_node",
            Self::TerminalReached { .. } => "session.terminal_reached",
            Self::CountdownTick { .. } => "session.countdown_tick",
            Self::CountdownExpired => "session.countdown_expired",
            Self::StoryUnavailable { .. } => "session.story_unavailable",
        }
    }
}

impl From<TraversalEvent> for SessionEvent {
    fn from(event: TraversalEvent) -> Self {
        match event {
            TraversalEvent::ShowPrompt {
                node_id,
                prompt_index,
            } => Self::ShowPrompt {
                node_id,
                prompt_index,
            },
            TraversalEvent::AwaitChoice { node_id, choices } => {
                Self::AwaitChoice { node_id, choices }
            }
            TraversalEvent::EnterNode { node_id } => Self::EnterNode { node_id },
            TraversalEvent::TerminalReached { node_id } => Self::TerminalReached { node_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_tick_serializes_with_tag() {
        let event = SessionEvent::CountdownTick {
            remaining_seconds: 12,
            limit_seconds: 200,
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "event": "countdown_tick",
                "remaining_seconds": 12,
                "limit_seconds": 200
            })
        );
    }

    #[test]
    fn test_traversal_events_convert() {
        let event: SessionEvent = TraversalEvent::EnterNode {
            node_id: NodeId::from("ep2"),
        }
        .into();

        assert_eq!(
            event,
            SessionEvent::EnterNode {
                node_id: NodeId::from("ep2")
            }
        );
        assert_eq!(event.event_type(), "session.enter_node");
    }
}
