//! Session orchestration and the real-time ticker.

pub mod session;
pub mod ticker;
