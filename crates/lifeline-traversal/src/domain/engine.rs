//! The traversal engine.
//!
//! Pure decision functions over an explicit `PlaythroughState` and a shared
//! `StoryGraph`. The engine never waits or schedules anything; the caller
//! invokes it whenever a prompt has finished presenting, a choice is made, or
//! the countdown expires.

use lifeline_core::error::StoryError;
use lifeline_core::id::NodeId;
use lifeline_core::rng::DeterministicRng;
use lifeline_story::domain::graph::{Node, NodeKind, StoryGraph};
use tracing::{debug, info, instrument, warn};

use super::events::{NodeEntry, TraversalEvent};
use super::link::resolve_link;
use super::state::{PlaythroughState, TraversalPhase};
use super::statistics::checkpoint;

/// Decides what to render next.
#[derive(Debug, Clone)]
pub struct TraversalEngine {
    clear_node_id: NodeId,
}

impl TraversalEngine {
    /// Creates an engine whose fallback and successful ending is
    /// `clear_node_id`.
    #[must_use]
    pub fn new(clear_node_id: NodeId) -> Self {
        Self { clear_node_id }
    }

    /// Starts a playthrough at `start_node_id`, prompt 0.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Graph` if the start node is absent, or if it is
    /// malformed and the clear node is absent too.
    #[instrument(skip(self, graph), fields(start = %start_node_id))]
    pub fn begin_session(
        &self,
        graph: &StoryGraph,
        start_node_id: &NodeId,
    ) -> Result<PlaythroughState, StoryError> {
        if !graph.contains(start_node_id.as_str()) {
            return Err(StoryError::Graph(start_node_id.clone()));
        }
        let mut state = PlaythroughState::new(start_node_id.clone());
        self.enter_node(&mut state, graph, start_node_id)?;
        Ok(state)
    }

    /// Describes the current position without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Graph` if the current node has vanished from the
    /// graph.
    pub fn current_event(
        &self,
        state: &PlaythroughState,
        graph: &StoryGraph,
    ) -> Result<TraversalEvent, StoryError> {
        let node = self.current_node(state, graph)?;
        let event = match &state.phase {
            TraversalPhase::ShowingPrompt => show_prompt(state),
            TraversalPhase::AwaitingChoice => TraversalEvent::AwaitChoice {
                node_id: node.id.clone(),
                choices: node.choices.clone(),
            },
            TraversalPhase::EnteringNode(target) => TraversalEvent::EnterNode {
                node_id: target.clone(),
            },
            TraversalPhase::Terminal if state.current_prompt_index < node.prompts.len() => {
                show_prompt(state)
            }
            TraversalPhase::Terminal => TraversalEvent::TerminalReached {
                node_id: node.id.clone(),
            },
        };
        Ok(event)
    }

    /// Moves past the prompt that has just finished presenting.
    ///
    /// Shows the next prompt of the node if there is one. Otherwise records
    /// the statistics checkpoint for this visit and either offers the node's
    /// choices or resolves its `next` link. While a choice or an entry is
    /// pending, repeats the pending event unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Graph` if the current node has vanished from the
    /// graph.
    pub fn advance(
        &self,
        state: &mut PlaythroughState,
        graph: &StoryGraph,
        rng: &mut dyn DeterministicRng,
    ) -> Result<TraversalEvent, StoryError> {
        if matches!(
            state.phase,
            TraversalPhase::AwaitingChoice | TraversalPhase::EnteringNode(_)
        ) {
            return self.current_event(state, graph);
        }

        let node = self.current_node(state, graph)?;
        let next_index = state.current_prompt_index + 1;
        if next_index < node.prompts.len() {
            state.current_prompt_index = next_index;
            return Ok(show_prompt(state));
        }

        if state.phase == TraversalPhase::Terminal {
            return Ok(TraversalEvent::TerminalReached {
                node_id: node.id.clone(),
            });
        }

        if !state.checkpointed {
            checkpoint(&mut state.stats, node);
            state.checkpointed = true;
            debug!(node_id = %node.id, stats = ?state.stats, "checkpoint recorded");
        }

        match node.kind {
            NodeKind::Choice => {
                state.phase = TraversalPhase::AwaitingChoice;
                Ok(TraversalEvent::AwaitChoice {
                    node_id: node.id.clone(),
                    choices: node.choices.clone(),
                })
            }
            NodeKind::Lines => {
                let target = resolve_link(&node.next, &self.clear_node_id, rng);
                debug!(from = %node.id, to = %target, "lines exhausted");
                state.phase = TraversalPhase::EnteringNode(target.clone());
                Ok(TraversalEvent::EnterNode { node_id: target })
            }
        }
    }

    /// Follows choice `choice_index` of the current node.
    ///
    /// The engine does not remember whether a choice was already made for
    /// this await; callers must not select twice.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::ChoiceIndex` if the index is out of range (the
    /// state is left untouched), or `StoryError::Graph` if the current node
    /// has vanished from the graph.
    pub fn resolve_choice(
        &self,
        state: &mut PlaythroughState,
        graph: &StoryGraph,
        choice_index: usize,
        rng: &mut dyn DeterministicRng,
    ) -> Result<TraversalEvent, StoryError> {
        let node = self.current_node(state, graph)?;
        let choices = match node.kind {
            NodeKind::Choice => node.choices.as_slice(),
            NodeKind::Lines => &[],
        };
        let choice = choices.get(choice_index).ok_or(StoryError::ChoiceIndex {
            index: choice_index,
            available: choices.len(),
        })?;

        let target = resolve_link(&choice.next, &self.clear_node_id, rng);
        info!(node_id = %node.id, choice = %choice.label, to = %target, "choice resolved");
        state.phase = TraversalPhase::EnteringNode(target.clone());
        Ok(TraversalEvent::EnterNode { node_id: target })
    }

    /// Makes `node_id` the current node at prompt 0.
    ///
    /// An absent or malformed node is replaced by the clear node. Arriving at
    /// the clear node, directly or by substitution, is terminal and asks the
    /// caller to stop the countdown.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Graph` if the clear node is needed but absent.
    pub fn enter_node(
        &self,
        state: &mut PlaythroughState,
        graph: &StoryGraph,
        node_id: &NodeId,
    ) -> Result<NodeEntry, StoryError> {
        let (node, substituted) = match graph.get(node_id.as_str()) {
            Some(node) if node.id == self.clear_node_id => (node, false),
            Some(node) => match node.check() {
                Ok(()) => (node, false),
                Err(err) => {
                    warn!(error = %err, "malformed node, entering clear node");
                    (self.clear_node(graph)?, true)
                }
            },
            None => {
                warn!(node_id = %node_id, "node not in graph, entering clear node");
                (self.clear_node(graph)?, true)
            }
        };

        let terminal = node.id == self.clear_node_id;
        state.current_node_id = node.id.clone();
        state.current_prompt_index = 0;
        state.checkpointed = false;
        state.phase = if terminal {
            TraversalPhase::Terminal
        } else {
            TraversalPhase::ShowingPrompt
        };

        let event = if terminal && node.prompts.is_empty() {
            TraversalEvent::TerminalReached {
                node_id: node.id.clone(),
            }
        } else {
            show_prompt(state)
        };

        debug!(node_id = %node.id, terminal, substituted, "node entered");
        Ok(NodeEntry {
            event,
            stop_countdown: terminal,
            substituted,
        })
    }

    /// Enters `end_node_id` because the countdown expired, abandoning any
    /// pending choice or entry.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Graph` if the end node is unusable and the clear
    /// node is absent.
    pub fn force_end(
        &self,
        state: &mut PlaythroughState,
        graph: &StoryGraph,
        end_node_id: &NodeId,
    ) -> Result<NodeEntry, StoryError> {
        info!(
            from = %state.current_node_id,
            phase = ?state.phase,
            end = %end_node_id,
            "forcing end"
        );
        self.enter_node(state, graph, end_node_id)
    }

    fn clear_node<'g>(&self, graph: &'g StoryGraph) -> Result<&'g Node, StoryError> {
        graph
            .get(self.clear_node_id.as_str())
            .ok_or_else(|| StoryError::Graph(self.clear_node_id.clone()))
    }

    fn current_node<'g>(
        &self,
        state: &PlaythroughState,
        graph: &'g StoryGraph,
    ) -> Result<&'g Node, StoryError> {
        graph
            .get(state.current_node_id.as_str())
            .ok_or_else(|| StoryError::Graph(state.current_node_id.clone()))
    }
}

fn show_prompt(state: &PlaythroughState) -> TraversalEvent {
    TraversalEvent::ShowPrompt {
        node_id: state.current_node_id.clone(),
        prompt_index: state.current_prompt_index,
    }
}
