//! The playthrough session.
//!
//! A `Session` owns everything one playthrough needs: the shared story graph,
//! the traversal engine and its state, the countdown, the RNG and the clock.
//! The presentation adapter calls it for every UI event and every countdown
//! pulse, one call at a time, and renders the returned events in order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lifeline_core::clock::Clock;
use lifeline_core::error::StoryError;
use lifeline_core::id::{NodeId, SessionId};
use lifeline_core::rng::DeterministicRng;
use lifeline_story::application::validation::validate_graph;
use lifeline_story::domain::graph::{Node, Prompt, StoryGraph};
use lifeline_traversal::domain::engine::TraversalEngine;
use lifeline_traversal::domain::events::{NodeEntry, TraversalEvent};
use lifeline_traversal::domain::state::PlaythroughState;
use lifeline_traversal::domain::statistics::PlayStats;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SessionConfig;
use crate::domain::countdown::{CountdownState, Tick};
use crate::domain::events::SessionEvent;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, not started.
    Idle,
    /// Story in progress.
    Playing,
    /// The clear node was reached; its prompts may still be showing.
    Finished,
    /// The story could not be played.
    Unavailable,
}

/// How a playthrough ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Not started yet.
    NotStarted,
    /// Still going.
    InProgress,
    /// Reached the clear node before time ran out.
    Cleared,
    /// The countdown expired.
    TimedOut,
    /// The story could not be played.
    Unavailable,
}

/// End-of-run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct PlaythroughSummary {
    /// The playthrough.
    pub session_id: SessionId,
    /// How it ended.
    pub outcome: Outcome,
    /// Accumulated counters.
    pub stats: PlayStats,
    /// Countdown limit, once started.
    pub limit_seconds: Option<u32>,
    /// Countdown remainder, once started.
    pub remaining_seconds: Option<u32>,
    /// When play began.
    pub started_at: Option<DateTime<Utc>>,
    /// When the clear node was reached or the story became unavailable.
    pub finished_at: Option<DateTime<Utc>>,
}

/// One playthrough of a story.
pub struct Session {
    id: SessionId,
    graph: Arc<StoryGraph>,
    config: SessionConfig,
    engine: TraversalEngine,
    rng: Box<dyn DeterministicRng>,
    clock: Arc<dyn Clock>,
    state: Option<PlaythroughState>,
    countdown: Option<CountdownState>,
    status: SessionStatus,
    choice_locked: bool,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("state", &self.state)
            .field("countdown", &self.countdown)
            .field("choice_locked", &self.choice_locked)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates an idle session.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` if `config` is invalid.
    pub fn new(
        graph: Arc<StoryGraph>,
        config: SessionConfig,
        rng: Box<dyn DeterministicRng>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoryError> {
        config.validate()?;
        Ok(Self {
            id: SessionId::new(),
            graph,
            engine: TraversalEngine::new(config.clear_node_id.clone()),
            config,
            rng,
            clock,
            state: None,
            countdown: None,
            status: SessionStatus::Idle,
            choice_locked: false,
            started_at: None,
            finished_at: None,
        })
    }

    /// Begins play: checks the graph, starts the countdown and shows the
    /// first prompt. Does nothing unless the session is idle.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn start(&mut self) -> Vec<SessionEvent> {
        if self.status != SessionStatus::Idle {
            debug!(status = ?self.status, "start ignored");
            return Vec::new();
        }

        let report = validate_graph(
            &self.graph,
            &self.config.clear_node_id,
            &[&self.config.start_node_id, &self.config.clear_node_id],
        );
        if !self.graph.contains(self.config.end_node_id.as_str()) {
            warn!(end = %self.config.end_node_id, "end node missing, expiry will fall back to clear node");
        }
        let warnings = match report.into_result() {
            Ok(warnings) => warnings,
            Err(err) => return self.fail(err),
        };
        for issue in &warnings {
            warn!(node_id = %issue.node_id, message = %issue.message, "story graph issue");
        }

        let state = match self
            .engine
            .begin_session(&self.graph, &self.config.start_node_id)
        {
            Ok(state) => state,
            Err(err) => return self.fail(err),
        };

        let mut countdown = CountdownState::start(self.config.countdown, self.rng.as_mut());
        let mut events = vec![SessionEvent::CountdownTick {
            remaining_seconds: countdown.remaining_seconds(),
            limit_seconds: countdown.limit_seconds(),
        }];

        self.started_at = Some(self.clock.now());
        self.status = SessionStatus::Playing;
        if state.is_terminal() {
            countdown.pause();
            self.finish();
        }

        match self.engine.current_event(&state, &self.graph) {
            Ok(event) => events.push(event.into()),
            Err(err) => return self.fail(err),
        }

        info!(
            limit_seconds = countdown.limit_seconds(),
            version_hash = self.graph.version_hash(),
            "playthrough started"
        );
        self.countdown = Some(countdown);
        self.state = Some(state);
        events
    }

    /// The current prompt has finished presenting.
    pub fn prompt_finished(&mut self) -> Vec<SessionEvent> {
        if !self.is_active() {
            return Vec::new();
        }
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };

        match self.engine.advance(state, &self.graph, self.rng.as_mut()) {
            Ok(TraversalEvent::EnterNode { node_id }) => self.follow(node_id),
            Ok(event) => {
                if matches!(event, TraversalEvent::AwaitChoice { .. }) {
                    self.choice_locked = false;
                }
                vec![event.into()]
            }
            Err(err) => self.fail(err),
        }
    }

    /// The player picked choice `index`.
    ///
    /// Only the first selection per choice await counts. Selections made
    /// when no choice is pending (including after the countdown forced the
    /// ending) are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::ChoiceIndex` if `index` is out of range; the
    /// choice stays open.
    pub fn choose(&mut self, index: usize) -> Result<Vec<SessionEvent>, StoryError> {
        if !self.is_active() || self.choice_locked {
            debug!(index, locked = self.choice_locked, "choice ignored");
            return Ok(Vec::new());
        }
        let Some(state) = self.state.as_mut() else {
            return Ok(Vec::new());
        };
        if !state.is_awaiting_choice() {
            debug!(index, "choice ignored, none pending");
            return Ok(Vec::new());
        }

        match self
            .engine
            .resolve_choice(state, &self.graph, index, self.rng.as_mut())
        {
            Ok(TraversalEvent::EnterNode { node_id }) => {
                self.choice_locked = true;
                Ok(self.follow(node_id))
            }
            Ok(event) => Ok(vec![event.into()]),
            Err(err) if err.is_recoverable() => Err(err),
            Err(err) => Ok(self.fail(err)),
        }
    }

    /// Jumps to `node_id` directly.
    pub fn enter_node(&mut self, node_id: &NodeId) -> Vec<SessionEvent> {
        if !self.is_active() {
            return Vec::new();
        }
        self.enter(node_id, false)
    }

    /// One real-time second elapsed.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let Some(countdown) = self.countdown.as_mut() else {
            return Vec::new();
        };
        match countdown.tick() {
            Tick::Idle => Vec::new(),
            Tick::Ticked {
                remaining_seconds,
                limit_seconds,
            } => vec![SessionEvent::CountdownTick {
                remaining_seconds,
                limit_seconds,
            }],
            Tick::Expired { limit_seconds } => {
                info!(session_id = %self.id, limit_seconds, "countdown expired");
                let mut events = vec![
                    SessionEvent::CountdownTick {
                        remaining_seconds: 0,
                        limit_seconds,
                    },
                    SessionEvent::CountdownExpired,
                ];
                let end = self.config.end_node_id.clone();
                events.extend(self.enter(&end, true));
                events
            }
        }
    }

    /// Throws the playthrough away and starts a fresh one.
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        info!(previous = %self.id, "restarting");
        self.id = SessionId::new();
        self.state = None;
        self.countdown = None;
        self.status = SessionStatus::Idle;
        self.choice_locked = false;
        self.started_at = None;
        self.finished_at = None;
        self.start()
    }

    /// End-of-run statistics, available at any time.
    #[must_use]
    pub fn summary(&self) -> PlaythroughSummary {
        let expired = self.countdown.is_some_and(|c| c.is_expired());
        let outcome = match self.status {
            SessionStatus::Idle => Outcome::NotStarted,
            SessionStatus::Unavailable => Outcome::Unavailable,
            _ if expired => Outcome::TimedOut,
            SessionStatus::Finished => Outcome::Cleared,
            SessionStatus::Playing => Outcome::InProgress,
        };
        PlaythroughSummary {
            session_id: self.id,
            outcome,
            stats: self.state.as_ref().map(PlaythroughState::stats).unwrap_or_default(),
            limit_seconds: self.countdown.map(|c| c.limit_seconds()),
            remaining_seconds: self.countdown.map(|c| c.remaining_seconds()),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// This playthrough's id.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Lifecycle status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Traversal state, once started.
    #[must_use]
    pub fn state(&self) -> Option<&PlaythroughState> {
        self.state.as_ref()
    }

    /// Countdown, once started.
    #[must_use]
    pub fn countdown(&self) -> Option<&CountdownState> {
        self.countdown.as_ref()
    }

    /// The roles configured for this session.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Looks up a node, for rendering.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.graph.get(node_id.as_str())
    }

    /// Looks up a prompt, for rendering.
    #[must_use]
    pub fn prompt(&self, node_id: &NodeId, prompt_index: usize) -> Option<&Prompt> {
        self.node(node_id)?.prompts.get(prompt_index)
    }

    fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Playing | SessionStatus::Finished)
    }

    /// Emits the `EnterNode` event for a resolved target and enters it.
    fn follow(&mut self, node_id: NodeId) -> Vec<SessionEvent> {
        let mut events = vec![SessionEvent::EnterNode {
            node_id: node_id.clone(),
        }];
        events.extend(self.enter(&node_id, false));
        events
    }

    fn enter(&mut self, node_id: &NodeId, forced: bool) -> Vec<SessionEvent> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        let result = if forced {
            self.engine.force_end(state, &self.graph, node_id)
        } else {
            self.engine.enter_node(state, &self.graph, node_id)
        };

        match result {
            Ok(NodeEntry {
                event,
                stop_countdown,
                ..
            }) => {
                if stop_countdown {
                    if let Some(countdown) = self.countdown.as_mut() {
                        countdown.pause();
                    }
                    self.finish();
                }
                vec![event.into()]
            }
            Err(err) => self.fail(err),
        }
    }

    fn finish(&mut self) {
        if self.status == SessionStatus::Playing {
            self.status = SessionStatus::Finished;
            self.finished_at = Some(self.clock.now());
            info!(session_id = %self.id, "clear node reached");
        }
    }

    fn fail(&mut self, err: StoryError) -> Vec<SessionEvent> {
        error!(session_id = %self.id, error = %err, "story unavailable");
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.pause();
        }
        self.status = SessionStatus::Unavailable;
        self.finished_at = Some(self.clock.now());
        vec![SessionEvent::StoryUnavailable {
            reason: err.to_string(),
        }]
    }
}
