//! Playthrough statistics.

use lifeline_story::domain::graph::{Node, NodeKind, TextCount};
use serde::Serialize;

/// Counters accumulated over one playthrough. They only ever grow, and are
/// reset only by starting a new session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayStats {
    /// Characters of story text read, as authored per node.
    pub read_text_count: u64,
    /// Choice nodes whose choices were reached.
    pub choice_moment_count: u64,
    /// Total options offered across those choice nodes.
    pub choice_option_count: u64,
}

/// Coerces an authored text count to a number. Missing, non-numeric,
/// negative and non-finite values count as zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn coerce_text_count(count: Option<&TextCount>) -> u64 {
    let value = match count {
        None => return 0,
        Some(TextCount::Number(n)) => *n,
        Some(TextCount::Text(s)) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return 0,
        },
    };
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

/// Records the visit of `node` whose last prompt has just been reached.
pub fn checkpoint(stats: &mut PlayStats, node: &Node) {
    stats.read_text_count = stats
        .read_text_count
        .saturating_add(coerce_text_count(node.total_text_count.as_ref()));

    if node.kind == NodeKind::Choice {
        stats.choice_moment_count += 1;
        stats.choice_option_count += node.choices.len() as u64;
    }
}
