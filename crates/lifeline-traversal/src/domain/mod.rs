//! Traversal state machine and its supporting pieces.

pub mod engine;
pub mod events;
pub mod link;
pub mod state;
pub mod statistics;
