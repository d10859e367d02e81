//! Shared helpers for session integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use lifeline_core::rng::DeterministicRng;
use lifeline_session::application::session::Session;
use lifeline_session::config::SessionConfig;
use lifeline_session::domain::countdown::CountdownRange;
use lifeline_session::domain::events::SessionEvent;
use lifeline_story::application::loader::load_story;
use lifeline_story::domain::graph::StoryGraph;
use lifeline_test_support::{FixedClock, InMemoryStorySource, MockRng};

/// The sample story shipped with the player.
pub const SAMPLE_STORY: &str = include_str!("../../../../data/story.yaml");

/// Loads `text` through the regular loader.
pub async fn load(text: &str) -> Arc<StoryGraph> {
    let source = InMemoryStorySource::yaml(text);
    Arc::new(load_story(&source).await.unwrap())
}

/// A session over the sample story with a fixed countdown limit.
pub async fn sample_session(limit_seconds: u32) -> Session {
    session_with(load(SAMPLE_STORY).await, limit_seconds, Box::new(MockRng))
}

/// A session over `graph` with a fixed countdown limit.
pub fn session_with(
    graph: Arc<StoryGraph>,
    limit_seconds: u32,
    rng: Box<dyn DeterministicRng>,
) -> Session {
    let config = SessionConfig {
        countdown: CountdownRange::new(limit_seconds, limit_seconds).unwrap(),
        ..SessionConfig::default()
    };
    Session::new(graph, config, rng, Arc::new(FixedClock::standard())).unwrap()
}

/// Reports every prompt as finished until the story waits for a choice or
/// reaches its terminal screen. Returns everything emitted on the way.
pub fn play_until_pause(session: &mut Session) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for _ in 0..100 {
        let batch = session.prompt_finished();
        let paused = batch.iter().any(|event| {
            matches!(
                event,
                SessionEvent::AwaitChoice { .. }
                    | SessionEvent::TerminalReached { .. }
                    | SessionEvent::StoryUnavailable { .. }
            )
        });
        events.extend(batch);
        if paused {
            return events;
        }
    }
    panic!("story never paused: {events:?}");
}

/// Node ids of every `EnterNode` event, in order.
pub fn entered(events: &[SessionEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::EnterNode { node_id } => Some(node_id.to_string()),
            _ => None,
        })
        .collect()
}
