//! Lifeline — Story Graph.
//!
//! Responsible for the immutable story graph model, parsing YAML/JSON story
//! documents into it, version hashing, and static validation.

pub mod application;
pub mod domain;
