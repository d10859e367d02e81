//! Lifeline Core — shared story-player abstractions.
//!
//! This crate defines the identifiers, the error type, and the randomness and
//! wall-clock seams that every other Lifeline crate depends on. It contains no
//! I/O.

pub mod clock;
pub mod error;
pub mod id;
pub mod rng;
