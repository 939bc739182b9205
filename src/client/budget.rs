//! Dispatch admission for one call type
//!
//! A [`RateBudget`] combines a concurrency cap with a minimum inter-dispatch
//! interval. Every outbound call must pass through [`RateBudget::admit`],
//! which hands back a permit once both constraints are satisfied. The permit
//! must be held for the duration of the network call and dropped before any
//! throttle-triggered backoff sleep, so that a caller waiting out a 429 does
//! not starve other callers of a slot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use crate::error::{Error, Result};

/// Shared admission state for one call type
///
/// Clones share the same semaphore and last-dispatch timestamp, so every
/// caller of a call type is paced against the same budget.
#[derive(Clone)]
pub struct RateBudget {
    semaphore: Arc<Semaphore>,
    last_dispatch: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

/// Proof of admission for a single dispatch
///
/// Holds the concurrency slot; dropping it releases the slot.
pub struct DispatchPermit {
    _permit: OwnedSemaphorePermit,
}

impl RateBudget {
    pub fn new(max_concurrency: usize, min_interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            last_dispatch: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait for a concurrency slot, then for the pacing interval
    ///
    /// The timestamp lock is held across the pacing sleep so that the
    /// check-and-update is atomic: two callers can never compute a stale
    /// wait and dispatch too close together. The timestamp is written only
    /// once the pacing sleep has completed; a caller cancelled mid-wait
    /// leaves the shared state untouched.
    pub async fn admit(&self) -> Result<DispatchPermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::Other(format!("concurrency slot unavailable: {}", e)))?;

        let mut last = self.last_dispatch.lock().await;
        if let Some(previous) = *last {
            let since_last = previous.elapsed();
            if since_last < self.min_interval {
                tokio::time::sleep(self.min_interval - since_last).await;
            }
        }
        *last = Some(Instant::now());
        drop(last);

        Ok(DispatchPermit { _permit: permit })
    }

    /// Number of slots currently available
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
impl RateBudget {
    /// Read the last dispatch timestamp (for testing only)
    pub async fn last_dispatch(&self) -> Option<Instant> {
        *self.last_dispatch.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_dispatches_are_spaced_by_min_interval() {
        let budget = RateBudget::new(4, Duration::from_millis(50));

        let mut stamps = Vec::new();
        for _ in 0..3 {
            let _permit = budget.admit().await.unwrap();
            stamps.push(Instant::now());
        }

        for pair in stamps.windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            assert!(
                gap >= Duration::from_millis(49),
                "dispatches only {:?} apart",
                gap
            );
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_cap() {
        let budget = RateBudget::new(2, Duration::from_millis(1));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let budget = budget.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let _permit = budget.admit().await.unwrap();
                let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(current, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(budget.available_slots(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_wait_does_not_update_timestamp() {
        let budget = RateBudget::new(1, Duration::from_millis(200));

        let _first = budget.admit().await.unwrap();
        let stamp = budget.last_dispatch().await.unwrap();
        drop(_first);

        // The second admission acquires its slot immediately but is cancelled
        // during the pacing sleep.
        let result =
            tokio::time::timeout(Duration::from_millis(20), budget.admit()).await;
        assert!(result.is_err(), "admission should still be pacing");

        assert_eq!(budget.last_dispatch().await, Some(stamp));
        assert_eq!(budget.available_slots(), 1, "cancelled wait must release its slot");
    }

    #[tokio::test]
    async fn test_first_admission_does_not_wait() {
        let budget = RateBudget::new(1, Duration::from_secs(30));

        let start = Instant::now();
        let _permit = budget.admit().await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
