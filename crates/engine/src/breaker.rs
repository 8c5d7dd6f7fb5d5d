//! The circuit breaker: a saturating consecutive-failure counter.
//!
//! Retry and backoff live inside the generator client; by the time a failure
//! reaches the breaker it has already been retried. Three in a row with no
//! intervening success force a pause.

use std::sync::atomic::{AtomicU32, Ordering};

/// Consecutive failures that force a pause.
pub const BREAKER_THRESHOLD: u32 = 3;

/// Counts consecutive generation failures.
#[derive(Debug, Default)]
pub struct CircuitBreaker {
    failures: AtomicU32,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure. Returns `true` when this failure trips the
    /// breaker; the counter resets to 0 on the trip.
    pub fn note_failure(&self) -> bool {
        let count = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= BREAKER_THRESHOLD {
            self.failures.store(0, Ordering::SeqCst);
            return true;
        }
        false
    }

    /// Any successful generative call, or a user-initiated resume.
    pub fn reset(&self) {
        self.failures.store(0, Ordering::SeqCst);
    }

    pub fn count(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }
}
