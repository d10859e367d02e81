//! The survival countdown.
//!
//! Ticks once per real-time second, independently of how far the story has
//! progressed. It never calls into the traversal engine; expiry is only
//! signalled.

use lifeline_core::error::StoryError;
use lifeline_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

/// Inclusive range the countdown limit is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownRange {
    /// Shortest possible limit.
    pub min_seconds: u32,
    /// Longest possible limit.
    pub max_seconds: u32,
}

impl Default for CountdownRange {
    /// Three to five minutes.
    fn default() -> Self {
        Self {
            min_seconds: 180,
            max_seconds: 300,
        }
    }
}

impl CountdownRange {
    /// Creates a validated range.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` if the range is empty or starts at 0.
    pub fn new(min_seconds: u32, max_seconds: u32) -> Result<Self, StoryError> {
        let range = Self {
            min_seconds,
            max_seconds,
        };
        range.validate()?;
        Ok(range)
    }

    /// Checks the range is usable.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Validation` if the range is empty or starts at 0.
    pub fn validate(&self) -> Result<(), StoryError> {
        if self.min_seconds == 0 {
            return Err(StoryError::Validation(
                "countdown minimum must be at least 1 second".into(),
            ));
        }
        if self.min_seconds > self.max_seconds {
            return Err(StoryError::Validation(format!(
                "countdown range is empty: {}..={}",
                self.min_seconds, self.max_seconds
            )));
        }
        Ok(())
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not running; nothing changed.
    Idle,
    /// One second elapsed.
    Ticked {
        /// Seconds left.
        remaining_seconds: u32,
        /// The session's limit.
        limit_seconds: u32,
    },
    /// The last second elapsed. The countdown has stopped.
    Expired {
        /// The session's limit.
        limit_seconds: u32,
    },
}

/// Countdown for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountdownState {
    limit_seconds: u32,
    remaining_seconds: u32,
    running: bool,
}

impl CountdownState {
    /// Draws the limit uniformly from `range` and starts running.
    pub fn start(range: CountdownRange, rng: &mut dyn DeterministicRng) -> Self {
        let limit_seconds = rng
            .next_u32_range(range.min_seconds, range.max_seconds)
            .max(1);
        Self {
            limit_seconds,
            remaining_seconds: limit_seconds,
            running: true,
        }
    }

    /// Advances by one second. A no-op unless running.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
            Tick::Expired {
                limit_seconds: self.limit_seconds,
            }
        } else {
            Tick::Ticked {
                remaining_seconds: self.remaining_seconds,
                limit_seconds: self.limit_seconds,
            }
        }
    }

    /// Stops the countdown for good.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// The limit drawn at start.
    #[must_use]
    pub fn limit_seconds(&self) -> u32 {
        self.limit_seconds
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Whether ticks still count down.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the countdown ran out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }
}
