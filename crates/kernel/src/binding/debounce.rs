//! Trailing-edge debounce.
//!
//! The debouncer holds no timer of its own; callers pass the current
//! instant to `push` and `poll`, which keeps it deterministic under a paused
//! tokio clock.

use std::time::Duration;

use tokio::time::Instant;

/// Delay before a search input takes effect.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds the latest pushed value until it has been quiet for `delay`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, ready_at)| *ready_at <= now);
        if !ready {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// When the pending value becomes available, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, ready_at)| *ready_at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
