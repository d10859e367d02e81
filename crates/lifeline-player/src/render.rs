//! Text rendering for the terminal.

use std::fmt::Write as _;

use lifeline_session::application::session::{Outcome, PlaythroughSummary};
use lifeline_story::domain::graph::{Choice, Node, Prompt};

/// Textual stand-ins for the image, sound and scene cues of a prompt.
#[must_use]
pub fn prompt_cues(prompt: &Prompt) -> Vec<String> {
    let mut cues = Vec::new();
    if let Some(image) = &prompt.image {
        cues.push(format!("[image: {image}]"));
    }
    if let Some(sfx) = &prompt.sfx {
        cues.push(format!("[sfx: {sfx}]"));
    }
    if let Some(effect) = &prompt.scene_effect {
        cues.push(format!("[scene: {effect}]"));
    }
    cues
}

/// The background music cue of a node, if it differs from what is playing.
#[must_use]
pub fn bgm_cue(node: &Node, playing: Option<&str>) -> Option<String> {
    let bgm = node.bgm.as_deref()?;
    (playing != Some(bgm)).then(|| format!("[bgm: {bgm}]"))
}

/// Numbered choice list, one per line.
#[must_use]
pub fn choice_menu(choices: &[Choice]) -> String {
    let mut menu = String::new();
    for (i, choice) in choices.iter().enumerate() {
        let _ = writeln!(menu, "  {}) {}", i + 1, choice.label);
    }
    menu
}

/// Parses a 1-based menu selection into a choice index.
#[must_use]
pub fn parse_selection(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok()?.checked_sub(1)
}

/// `mm:ss`.
#[must_use]
pub fn clock_face(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Whether a countdown tick is worth printing. Every half minute, then every
/// second of the last ten.
#[must_use]
pub fn announce_tick(remaining_seconds: u32) -> bool {
    remaining_seconds <= 10 || remaining_seconds % 30 == 0
}

/// Countdown status line.
#[must_use]
pub fn countdown_line(remaining_seconds: u32, limit_seconds: u32) -> String {
    format!(
        "[time left {} / {}]",
        clock_face(remaining_seconds),
        clock_face(limit_seconds)
    )
}

/// End-of-run statistics screen.
#[must_use]
pub fn summary_screen(summary: &PlaythroughSummary) -> String {
    let headline = match summary.outcome {
        Outcome::Cleared => "You got them through the night.",
        Outcome::TimedOut => "Time ran out.",
        Outcome::Unavailable => "The story could not be played.",
        Outcome::NotStarted | Outcome::InProgress => "The story is not over yet.",
    };

    let mut screen = String::new();
    let _ = writeln!(screen, "==== {headline} ====");
    let _ = writeln!(screen, "  characters read   {}", summary.stats.read_text_count);
    let _ = writeln!(screen, "  choices faced     {}", summary.stats.choice_moment_count);
    let _ = writeln!(screen, "  options seen      {}", summary.stats.choice_option_count);
    if let (Some(limit), Some(remaining)) = (summary.limit_seconds, summary.remaining_seconds) {
        let _ = writeln!(
            screen,
            "  time used         {} of {}",
            clock_face(limit - remaining),
            clock_face(limit)
        );
    }
    screen.push_str("[r] restart  [q] quit\n");
    screen
}
