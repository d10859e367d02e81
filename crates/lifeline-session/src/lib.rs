//! Lifeline — Session & Countdown.
//!
//! Responsible for the survival countdown, wiring it to the traversal engine,
//! choice locking, restarts, and end-of-run summaries.

pub mod application;
pub mod config;
pub mod domain;
