//! Turns session events into terminal actions, and terminal input into
//! session calls.
//!
//! The controller is synchronous. The terminal loop feeds it countdown
//! pulses, finished animations and input lines, and carries out the actions
//! it returns.

use std::time::Duration;

use lifeline_core::id::NodeId;
use lifeline_session::application::session::Session;
use lifeline_session::domain::events::SessionEvent;
use lifeline_story::domain::graph::NodeKind;
use tracing::{debug, error, info, warn};

use crate::render;

/// One prompt to animate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    /// Identifies the animation; completions for older generations are stale.
    pub generation: u64,
    /// Text with line-break markers already resolved.
    pub text: String,
    /// Pause before the text starts.
    pub delay: Duration,
    /// Pause between characters. Zero prints the text at once.
    pub per_char: Duration,
}

/// Something the terminal loop must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write a line.
    Print(String),
    /// Start animating a prompt, superseding any running animation.
    Animate(Animation),
    /// Stop the running animation, if any.
    CancelAnimation,
    /// Leave the player.
    Quit,
}

/// What the player is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nothing started yet.
    Idle,
    /// A prompt is being animated.
    Animating,
    /// A lines prompt is fully shown; Enter continues.
    AwaitingNext,
    /// Choices are on screen.
    AwaitingChoice {
        /// How many options there are.
        available: usize,
    },
    /// The final screen is shown.
    Finished,
    /// The story cannot be played.
    Unavailable,
}

/// Drives one `Session` from terminal input.
#[derive(Debug)]
pub struct Controller {
    session: Session,
    typing_delay: Duration,
    generation: u64,
    mode: Mode,
    playing_bgm: Option<String>,
}

impl Controller {
    /// Wraps an idle session.
    #[must_use]
    pub fn new(session: Session, typing_delay: Duration) -> Self {
        Self {
            session,
            typing_delay,
            generation: 0,
            mode: Mode::Idle,
            playing_bgm: None,
        }
    }

    /// The session being played.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current input mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Generation of the most recent animation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts the playthrough.
    pub fn start(&mut self) -> Vec<Action> {
        let events = self.session.start();
        self.render(events)
    }

    /// One countdown second elapsed.
    pub fn on_pulse(&mut self) -> Vec<Action> {
        let events = self.session.tick();
        self.render(events)
    }

    /// Animation `generation` finished.
    pub fn on_animation_done(&mut self, generation: u64) -> Vec<Action> {
        if generation != self.generation || self.mode != Mode::Animating {
            debug!(generation, current = self.generation, "stale animation completion");
            return Vec::new();
        }

        let on_choice_node = self
            .session
            .state()
            .and_then(|state| self.session.node(state.current_node_id()))
            .is_some_and(|node| node.kind == NodeKind::Choice);
        if on_choice_node {
            let events = self.session.prompt_finished();
            self.render(events)
        } else {
            self.mode = Mode::AwaitingNext;
            vec![Action::Print("  (Enter)".into())]
        }
    }

    /// The player typed `line`.
    pub fn on_input(&mut self, line: &str) -> Vec<Action> {
        let input = line.trim();
        if input.eq_ignore_ascii_case("q") {
            return vec![Action::CancelAnimation, Action::Quit];
        }

        match self.mode {
            Mode::Idle | Mode::Animating => Vec::new(),
            Mode::AwaitingNext => {
                let events = self.session.prompt_finished();
                self.render(events)
            }
            Mode::AwaitingChoice { available } => match render::parse_selection(input) {
                Some(index) => match self.session.choose(index) {
                    Ok(events) => self.render(events),
                    Err(err) if err.is_recoverable() => {
                        warn!(error = %err, "choice rejected");
                        vec![Action::Print(format!("  pick 1 to {available}"))]
                    }
                    Err(err) => {
                        error!(error = %err, "choice failed");
                        self.mode = Mode::Unavailable;
                        vec![
                            Action::CancelAnimation,
                            Action::Print(format!("story unavailable: {err}")),
                            Action::Print("[Enter] quit".into()),
                        ]
                    }
                },
                None => vec![Action::Print(format!("  pick 1 to {available}"))],
            },
            Mode::Finished if input.eq_ignore_ascii_case("r") => {
                self.playing_bgm = None;
                let mut actions = vec![Action::CancelAnimation, Action::Print(String::new())];
                let events = self.session.restart();
                actions.extend(self.render(events));
                actions
            }
            Mode::Finished => vec![Action::Print("[r] restart  [q] quit".into())],
            Mode::Unavailable => vec![Action::Quit],
        }
    }

    fn render(&mut self, events: Vec<SessionEvent>) -> Vec<Action> {
        let mut actions = Vec::new();
        for event in events {
            debug!(event_type = event.event_type(), "rendering");
            match event {
                SessionEvent::ShowPrompt {
                    node_id,
                    prompt_index,
                } => {
                    // Music follows the node actually entered, which may be a
                    // substitute for the requested one.
                    if prompt_index == 0 {
                        actions.extend(self.bgm_for(&node_id));
                    }
                    let Some(prompt) = self.session.prompt(&node_id, prompt_index) else {
                        warn!(%node_id, prompt_index, "prompt vanished");
                        continue;
                    };
                    let per_char = if prompt.kind.is_typed() {
                        self.typing_delay
                    } else {
                        Duration::ZERO
                    };
                    let animation = Animation {
                        generation: self.generation + 1,
                        text: prompt.display_text(),
                        delay: Duration::from_millis(prompt.delay_ms),
                        per_char,
                    };
                    actions.extend(render::prompt_cues(prompt).into_iter().map(Action::Print));
                    self.generation = animation.generation;
                    self.mode = Mode::Animating;
                    actions.push(Action::Animate(animation));
                }
                SessionEvent::AwaitChoice { choices, .. } => {
                    self.mode = Mode::AwaitingChoice {
                        available: choices.len(),
                    };
                    actions.push(Action::Print(render::choice_menu(&choices)));
                }
                SessionEvent::EnterNode { .. } => {
                    actions.push(Action::Print(String::new()));
                }
                SessionEvent::TerminalReached { node_id } => {
                    actions.extend(self.bgm_for(&node_id));
                    self.mode = Mode::Finished;
                    let summary = self.session.summary();
                    match serde_json::to_string(&summary) {
                        Ok(json) => info!(summary = %json, "playthrough finished"),
                        Err(err) => warn!(error = %err, "summary not serializable"),
                    }
                    actions.push(Action::Print(render::summary_screen(&summary)));
                }
                SessionEvent::CountdownTick {
                    remaining_seconds,
                    limit_seconds,
                } => {
                    if render::announce_tick(remaining_seconds) {
                        actions.push(Action::Print(render::countdown_line(
                            remaining_seconds,
                            limit_seconds,
                        )));
                    }
                }
                SessionEvent::CountdownExpired => {
                    actions.push(Action::CancelAnimation);
                    actions.push(Action::Print("!! TIME IS UP !!".into()));
                }
                SessionEvent::StoryUnavailable { reason } => {
                    self.mode = Mode::Unavailable;
                    actions.push(Action::CancelAnimation);
                    actions.push(Action::Print(format!("story unavailable: {reason}")));
                    actions.push(Action::Print("[Enter] quit".into()));
                }
            }
        }
        actions
    }

    fn bgm_for(&mut self, node_id: &NodeId) -> Vec<Action> {
        let Some(node) = self.session.node(node_id) else {
            return Vec::new();
        };
        match render::bgm_cue(node, self.playing_bgm.as_deref()) {
            Some(cue) => {
                self.playing_bgm.clone_from(&node.bgm);
                vec![Action::Print(cue)]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lifeline_session::config::SessionConfig;
    use lifeline_session::domain::countdown::CountdownRange;
    use lifeline_story::domain::graph::{Link, Prompt, PromptKind};
    use lifeline_test_support::{FixedClock, MockRng, StoryBuilder, choice, single};

    use super::*;

    fn controller(limit: u32) -> Controller {
        let graph = StoryBuilder::new()
            .node(lifeline_story::domain::graph::Node {
                id: NodeId::from("ep1"),
                kind: NodeKind::Lines,
                prompts: vec![
                    Prompt {
                        kind: PromptKind::System,
                        delay_ms: 500,
                        ..Prompt::text("Connected.<br>Hello?")
                    },
                    Prompt::text("Anyone?"),
                ],
                choices: Vec::new(),
                next: single("ep2"),
                bgm: Some("rain.ogg".into()),
                total_text_count: None,
            })
            .choice(
                "ep2",
                &["A knock."],
                vec![choice("Open", Link::Clear), choice("Wait", single("ep_end"))],
            )
            .lines("ep_end", &["Too late."], Link::Clear)
            .bgm("doom.ogg")
            .lines("ep_clear", &["Morning."], Link::Clear)
            .build();
        let config = SessionConfig {
            countdown: CountdownRange::new(limit, limit).unwrap(),
            ..SessionConfig::default()
        };
        let session = Session::new(
            Arc::new(graph),
            config,
            Box::new(MockRng),
            Arc::new(FixedClock::standard()),
        )
        .unwrap();
        Controller::new(session, Duration::from_millis(25))
    }

    fn animation(actions: &[Action]) -> Option<&Animation> {
        actions.iter().find_map(|action| match action {
            Action::Animate(animation) => Some(animation),
            _ => None,
        })
    }

    #[test]
    fn test_start_cues_bgm_and_animates_system_prompt_at_once() {
        let mut controller = controller(240);

        let actions = controller.start();

        assert_eq!(actions[0], Action::Print("[time left 04:00 / 04:00]".into()));
        assert_eq!(actions[1], Action::Print("[bgm: rain.ogg]".into()));
        assert_eq!(
            animation(&actions),
            Some(&Animation {
                generation: 1,
                text: "Connected.\nHello?".into(),
                delay: Duration::from_millis(500),
                per_char: Duration::ZERO,
            })
        );
        assert_eq!(controller.mode(), Mode::Animating);
    }

    #[test]
    fn test_lines_prompt_waits_for_enter() {
        // Arrange
        let mut controller = controller(240);
        controller.start();

        // Act
        let ignored = controller.on_input("");
        let done = controller.on_animation_done(1);
        let next = controller.on_input("");

        // Assert
        assert!(ignored.is_empty());
        assert_eq!(done, vec![Action::Print("  (Enter)".into())]);
        let typed = animation(&next).unwrap();
        assert_eq!(typed.text, "Anyone?");
        assert_eq!(typed.per_char, Duration::from_millis(25));
    }

    #[test]
    fn test_stale_animation_completion_is_ignored() {
        let mut controller = controller(240);
        controller.start();
        controller.on_animation_done(1);
        controller.on_input("");

        assert!(controller.on_animation_done(1).is_empty());
        assert_eq!(controller.mode(), Mode::Animating);
    }

    #[test]
    fn test_choice_prompt_advances_to_menu_and_accepts_selection() {
        // Arrange
        let mut controller = controller(240);
        controller.start();
        controller.on_animation_done(1);
        controller.on_input("");
        controller.on_animation_done(2);
        controller.on_input("");

        // Act
        let menu = controller.on_animation_done(3);
        let bad = controller.on_input("7");
        let picked = controller.on_input("1");

        // Assert
        assert_eq!(menu, vec![Action::Print("  1) Open\n  2) Wait\n".into())]);
        assert_eq!(controller.session().summary().stats.choice_moment_count, 1);
        assert_eq!(bad, vec![Action::Print("  pick 1 to 2".into())]);
        assert_eq!(animation(&picked).unwrap().text, "Morning.");
    }

    #[test]
    fn test_terminal_screen_then_restart() {
        // Arrange
        let mut controller = controller(240);
        controller.start();
        controller.on_animation_done(1);
        controller.on_input("");
        controller.on_animation_done(2);
        controller.on_input("");
        controller.on_animation_done(3);
        controller.on_input("1");
        controller.on_animation_done(4);

        // Act
        let summary = controller.on_input("");
        let restarted = controller.on_input("r");

        // Assert
        assert!(matches!(summary.as_slice(), [Action::Print(screen)] if screen.contains("choices faced     1")));
        assert!(restarted.contains(&Action::Print("[bgm: rain.ogg]".into())));
        assert_eq!(animation(&restarted).unwrap().generation, 5);
        assert_eq!(controller.session().summary().stats.choice_moment_count, 0);
    }

    #[test]
    fn test_expiry_cancels_animation_and_plays_end_node() {
        let mut controller = controller(1);
        controller.start();

        let actions = controller.on_pulse();

        assert_eq!(actions[0], Action::Print("[time left 00:00 / 00:01]".into()));
        assert_eq!(actions[1], Action::CancelAnimation);
        assert!(actions.contains(&Action::Print("[bgm: doom.ogg]".into())));
        assert_eq!(animation(&actions).unwrap().text, "Too late.");
    }

    #[test]
    fn test_substituted_entry_cues_clear_node_bgm() {
        // Arrange
        let graph = StoryBuilder::new()
            .lines("ep1", &["Hello?"], single("ep_gone"))
            .lines("ep_clear", &["Morning."], Link::Clear)
            .bgm("dawn.ogg")
            .build();
        let session = Session::new(
            Arc::new(graph),
            SessionConfig::default(),
            Box::new(MockRng),
            Arc::new(FixedClock::standard()),
        )
        .unwrap();
        let mut controller = Controller::new(session, Duration::ZERO);
        controller.start();
        controller.on_animation_done(1);

        // Act
        let actions = controller.on_input("");

        // Assert
        assert!(actions.contains(&Action::Print("[bgm: dawn.ogg]".into())));
        assert_eq!(animation(&actions).unwrap().text, "Morning.");
    }

    #[test]
    fn test_quit_is_accepted_in_any_mode() {
        let mut controller = controller(240);
        controller.start();

        assert_eq!(
            controller.on_input("Q"),
            vec![Action::CancelAnimation, Action::Quit]
        );
    }
}
