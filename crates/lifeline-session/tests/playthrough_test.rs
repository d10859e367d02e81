//! Integration tests driving whole playthroughs of the sample story.

mod common;

use lifeline_core::id::NodeId;
use lifeline_session::application::session::{Outcome, SessionStatus};
use lifeline_session::domain::events::SessionEvent;
use lifeline_test_support::SequenceRng;

fn show(node: &str, index: usize) -> SessionEvent {
    SessionEvent::ShowPrompt {
        node_id: NodeId::from(node),
        prompt_index: index,
    }
}

#[tokio::test]
async fn test_clear_path_accumulates_statistics() {
    // Arrange
    let mut session = common::sample_session(240).await;
    let opening = session.start();
    assert_eq!(opening.last(), Some(&show("ep1", 0)));

    // Act
    let to_first_choice = common::play_until_pause(&mut session);
    let after_window = session.choose(0).unwrap();
    let to_second_choice = common::play_until_pause(&mut session);
    let after_door = session.choose(0).unwrap();
    let to_ending = common::play_until_pause(&mut session);

    // Assert
    assert_eq!(common::entered(&to_first_choice), vec!["ep2"]);
    assert_eq!(common::entered(&after_window), vec!["ep3a"]);
    assert_eq!(common::entered(&to_second_choice), vec!["ep4"]);
    assert_eq!(common::entered(&after_door), vec!["ep5"]);
    assert_eq!(common::entered(&to_ending), vec!["ep_clear"]);
    assert_eq!(
        to_ending.last(),
        Some(&SessionEvent::TerminalReached {
            node_id: NodeId::from("ep_clear")
        })
    );

    let summary = session.summary();
    assert_eq!(summary.outcome, Outcome::Cleared);
    assert_eq!(summary.stats.read_text_count, 180);
    assert_eq!(summary.stats.choice_moment_count, 2);
    assert_eq!(summary.stats.choice_option_count, 5);
    assert_eq!(summary.limit_seconds, Some(240));
}

#[tokio::test]
async fn test_second_window_branch_is_reachable() {
    let graph = common::load(common::SAMPLE_STORY).await;
    // Countdown limit first, then the window branch.
    let mut session = common::session_with(graph, 240, Box::new(SequenceRng::new(vec![240, 1])));
    session.start();
    common::play_until_pause(&mut session);

    let events = session.choose(0).unwrap();

    assert_eq!(
        events,
        vec![
            SessionEvent::EnterNode {
                node_id: NodeId::from("ep3b")
            },
            show("ep3b", 0),
        ]
    );
}

#[tokio::test]
async fn test_null_choice_goes_straight_to_clear_node() {
    let mut session = common::sample_session(240).await;
    session.start();
    common::play_until_pause(&mut session);

    let events = session.choose(2).unwrap();

    assert_eq!(
        events,
        vec![
            SessionEvent::EnterNode {
                node_id: NodeId::from("ep_clear")
            },
            show("ep_clear", 0),
        ]
    );
    assert_eq!(session.status(), SessionStatus::Finished);
    assert!(!session.countdown().unwrap().is_running());
    assert_eq!(session.summary().stats.read_text_count, 105);
}

#[tokio::test]
async fn test_timeout_during_choice_forces_end_node() {
    // Arrange
    let mut session = common::sample_session(3).await;
    session.start();
    common::play_until_pause(&mut session);
    assert!(session.state().unwrap().is_awaiting_choice());

    // Act
    let mut ticks = Vec::new();
    for _ in 0..3 {
        ticks.extend(session.tick());
    }
    let late_choice = session.choose(0).unwrap();

    // Assert
    assert_eq!(
        ticks,
        vec![
            SessionEvent::CountdownTick {
                remaining_seconds: 2,
                limit_seconds: 3
            },
            SessionEvent::CountdownTick {
                remaining_seconds: 1,
                limit_seconds: 3
            },
            SessionEvent::CountdownTick {
                remaining_seconds: 0,
                limit_seconds: 3
            },
            SessionEvent::CountdownExpired,
            show("ep_end", 0),
        ]
    );
    assert!(late_choice.is_empty());

    let ending = common::play_until_pause(&mut session);
    assert_eq!(common::entered(&ending), vec!["ep_clear"]);
    assert!(session.tick().is_empty());
    let summary = session.summary();
    assert_eq!(summary.outcome, Outcome::TimedOut);
    assert_eq!(summary.remaining_seconds, Some(0));
    assert_eq!(summary.stats.choice_moment_count, 1);
}

#[tokio::test]
async fn test_story_without_clear_node_is_unavailable() {
    let graph = common::load(
        r"
node_dict:
  ep1:
    node_tp: lines
    msg_list:
      - msg_tx: Hello
    next_ids: null
",
    )
    .await;
    let mut session = common::session_with(graph, 240, Box::new(lifeline_test_support::MockRng));

    let events = session.start();

    assert!(matches!(
        events.as_slice(),
        [SessionEvent::StoryUnavailable { reason }] if reason.contains("ep_clear")
    ));
    assert_eq!(session.status(), SessionStatus::Unavailable);
    assert!(session.countdown().is_none());
}

#[tokio::test]
async fn test_restart_begins_a_fresh_playthrough() {
    // Arrange
    let mut session = common::sample_session(5).await;
    session.start();
    common::play_until_pause(&mut session);
    session.choose(1).unwrap();
    session.tick();
    let first_id = session.id();

    // Act
    let events = session.restart();

    // Assert
    assert_ne!(session.id(), first_id);
    assert_eq!(
        events,
        vec![
            SessionEvent::CountdownTick {
                remaining_seconds: 5,
                limit_seconds: 5
            },
            show("ep1", 0),
        ]
    );
    let summary = session.summary();
    assert_eq!(summary.outcome, Outcome::InProgress);
    assert_eq!(summary.stats.read_text_count, 0);
    assert_eq!(summary.stats.choice_moment_count, 0);
}
