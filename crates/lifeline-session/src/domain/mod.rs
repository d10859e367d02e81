//! Countdown clock and session events.

pub mod countdown;
pub mod events;
