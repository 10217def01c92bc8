//! Measurement collection: kind-keyed synchronization with a deadline.
//!
//! The wait is keyed on the set of required kinds, never on a raw event
//! count: two temperatures and zero levels can't satisfy it. The deadline
//! and the channel-exhaustion path each bound the wait, so a missing page
//! element degrades to a partial result instead of hanging the run.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::types::{CollectedReadings, Measurement};

/// Default bound on how long a run waits for both readings.
pub const DEFAULT_COLLECT_DEADLINE: Duration = Duration::from_secs(10);

/// Gathers the expected measurement kinds from the channel.
pub struct ReadingCollector {
    deadline: Duration,
}

impl Default for ReadingCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingCollector {
    pub fn new() -> Self {
        Self {
            deadline: DEFAULT_COLLECT_DEADLINE,
        }
    }

    pub fn with_deadline(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Receive until both kinds are present, the channel is exhausted, or
    /// the deadline expires, whichever comes first. Arrival order is
    /// irrelevant; duplicates of a recorded kind are ignored.
    pub async fn collect(&self, mut rx: mpsc::Receiver<Measurement>) -> CollectedReadings {
        let mut readings = CollectedReadings::default();
        let deadline = Instant::now() + self.deadline;

        while !readings.is_complete() {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some(measurement)) => {
                    let kind = measurement.kind;
                    if !readings.record(measurement) {
                        debug!(kind = %kind, "duplicate measurement ignored");
                    }
                }
                Ok(None) => {
                    debug!("measurement channel exhausted");
                    break;
                }
                Err(_) => {
                    warn!(deadline = ?self.deadline, "deadline expired waiting for readings");
                    break;
                }
            }
        }

        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MeasurementKind;

    fn level(raw: &str) -> Measurement {
        Measurement::new(MeasurementKind::Level, raw)
    }

    fn temperature(raw: &str) -> Measurement {
        Measurement::new(MeasurementKind::Temperature, raw)
    }

    #[tokio::test]
    async fn test_collects_both_kinds_in_either_order() {
        for pair in [
            [level("915.2"), temperature("71")],
            [temperature("71"), level("915.2")],
        ] {
            let (tx, rx) = mpsc::channel(2);
            for m in pair {
                tx.send(m).await.unwrap();
            }
            drop(tx);

            let readings = ReadingCollector::new().collect(rx).await;
            assert_eq!(readings.level.as_deref(), Some("915.2"));
            assert_eq!(readings.temperature.as_deref(), Some("71"));
            assert!(readings.is_complete());
        }
    }

    #[tokio::test]
    async fn test_partial_result_when_channel_closes_early() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(temperature("71")).await.unwrap();
        drop(tx);

        let readings = ReadingCollector::new().collect(rx).await;
        assert_eq!(readings.temperature.as_deref(), Some("71"));
        assert!(readings.level.is_none());
    }

    #[tokio::test]
    async fn test_deadline_bounds_the_wait() {
        // Sender kept alive and silent: only the deadline can end this.
        let (tx, rx) = mpsc::channel::<Measurement>(2);

        let collector = ReadingCollector::with_deadline(Duration::from_millis(50));
        let readings = collector.collect(rx).await;

        assert_eq!(readings, CollectedReadings::default());
        drop(tx);
    }

    #[tokio::test]
    async fn test_two_of_one_kind_do_not_complete() {
        // Raw count is not the criterion: two temperatures leave the set
        // incomplete.
        let (tx, rx) = mpsc::channel(2);
        tx.send(temperature("71")).await.unwrap();
        tx.send(temperature("72")).await.unwrap();
        drop(tx);

        let readings = ReadingCollector::new().collect(rx).await;
        assert!(!readings.is_complete());
        assert_eq!(readings.temperature.as_deref(), Some("71"));
    }

    #[tokio::test]
    async fn test_stops_once_complete_without_draining() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(level("915.2")).await.unwrap();
        tx.send(temperature("71")).await.unwrap();

        // Sender still open: completion must come from the kind set.
        let readings = ReadingCollector::new().collect(rx).await;
        assert!(readings.is_complete());
        drop(tx);
    }
}
