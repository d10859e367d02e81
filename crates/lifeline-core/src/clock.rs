//! Wall-clock abstraction for playthrough timestamps.
//!
//! The countdown itself is driven by a real-time ticker, not by this trait.
//! `Clock` only stamps when a playthrough started and finished.

use chrono::{DateTime, Utc};

/// Source of the `started_at`/`finished_at` stamps on a playthrough.
pub trait Clock: Send + Sync {
    /// The moment to record.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host's UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
