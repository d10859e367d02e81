//! Real-time countdown pulses.
//!
//! The ticker only produces pulses; the adapter forwards each one to
//! `Session::tick` on the task that owns the session, so ticks and UI events
//! are never processed concurrently.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

/// One countdown second.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A single pulse from the ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownPulse {
    /// Pulses sent so far, starting at 1.
    pub sequence: u64,
}

/// Spawns a task sending one pulse per `period`, the first one a full
/// `period` after spawning. Stops when the receiver is dropped.
#[must_use]
pub fn spawn_countdown_ticker(
    period: Duration,
    pulses: mpsc::Sender<CountdownPulse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sequence = 0_u64;

        loop {
            interval.tick().await;
            sequence += 1;
            if pulses.send(CountdownPulse { sequence }).await.is_err() {
                debug!(sequence, "pulse receiver dropped, ticker stopping");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticker_sends_sequential_pulses() {
        // Arrange
        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn_countdown_ticker(Duration::from_millis(10), tx);

        // Act
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let third = rx.recv().await.unwrap();

        // Assert
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(third.sequence, 3);

        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_ticker_waits_one_period_before_first_pulse() {
        let (tx, mut rx) = mpsc::channel(1);
        let started = Instant::now();
        let handle = spawn_countdown_ticker(Duration::from_millis(50), tx);

        rx.recv().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        handle.abort();
    }
}
