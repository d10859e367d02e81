//! Shared helpers for player integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lifeline_player::controller::{Action, Animation, Controller, Mode};
use lifeline_session::application::session::Session;
use lifeline_session::config::SessionConfig;
use lifeline_session::domain::countdown::CountdownRange;
use lifeline_story::application::loader::{FileStorySource, load_story};
use lifeline_test_support::{FixedClock, MockRng};

/// Path of the sample story shipped with the player.
pub fn sample_story_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/story.yaml")
}

/// A controller over the sample story, loaded from disk.
pub async fn sample_controller(limit_seconds: u32) -> Controller {
    let graph = load_story(&FileStorySource::new(sample_story_path()))
        .await
        .unwrap();
    let config = SessionConfig {
        countdown: CountdownRange::new(limit_seconds, limit_seconds).unwrap(),
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

/// The animation requested by `actions`, if any.
pub fn animation(actions: &[Action]) -> Option<Animation> {
    actions.iter().find_map(|action| match action {
        Action::Animate(animation) => Some(animation.clone()),
        _ => None,
    })
}

/// Every printed line in `actions`.
pub fn printed(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::Print(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

/// Finishes every animation and presses Enter whenever asked, until the
/// controller waits for a choice or shows the final screen. Returns the
/// printed lines and the animated texts, including those of `first`.
pub fn play_through(controller: &mut Controller, first: &[Action]) -> (Vec<String>, Vec<String>) {
    let mut lines = printed(first);
    let mut texts: Vec<String> = animation(first).map(|a| a.text).into_iter().collect();
    for _ in 0..100 {
        let actions = match controller.mode() {
            Mode::Animating => controller.on_animation_done(controller.generation()),
            Mode::AwaitingNext => controller.on_input(""),
            _ => return (lines, texts),
        };
        lines.extend(printed(&actions));
        texts.extend(animation(&actions).map(|a| a.text));
    }
    panic!("playthrough never paused");
}
