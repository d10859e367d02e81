//! Lifeline reference terminal player.
//!
//! Loads a story, plays it in the terminal against a survival countdown and
//! shows the run's statistics at the end.

pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod terminal;
