//! Lifeline — Story Traversal.
//!
//! Responsible for deciding which node and prompt are active, what happens
//! when a prompt is exhausted or a choice is made, random branch resolution,
//! the clear-node fallback, and playthrough statistics.

pub mod domain;
