//! Debounce tracker for the stability flag.
//!
//! Readiness that flips true, false, true within the settle window must not
//! be reported stable until it holds continuously for the full window.
//! Time is injected so the tracker is deterministic under test.

use std::time::{Duration, Instant};

/// Tracks how long readiness has held continuously.
#[derive(Debug)]
pub struct StabilityTracker {
    window: Duration,
    held_since: Option<Instant>,
}

impl StabilityTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            held_since: None,
        }
    }

    /// The configured settle window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Feed the current readiness value; returns whether it has now held
    /// continuously for at least the window.
    ///
    /// Any false observation resets the clock.
    pub fn observe(&mut self, ready: bool, now: Instant) -> bool {
        if !ready {
            self.held_since = None;
            return false;
        }
        let since = *self.held_since.get_or_insert(now);
        now.duration_since(since) >= self.window
    }
}
