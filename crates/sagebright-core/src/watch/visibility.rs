//! Tab visibility tracking.
//!
//! Records hidden/focus transitions reported by the embedder and answers
//! whether a session re-check is warranted after the tab regains focus.
//! Time is passed in by the caller so tests stay deterministic.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tracks hidden/visible transitions for one tab.
pub struct VisibilityWatcher {
    inner: Mutex<VisibilityState>,
}

struct VisibilityState {
    hidden_at: Option<Instant>,
    last_focus: Option<Instant>,
    was_hidden: bool,
    last_hidden_span: Option<Duration>,
}

impl VisibilityWatcher {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VisibilityState {
                hidden_at: None,
                last_focus: None,
                was_hidden: false,
                last_hidden_span: None,
            }),
        }
    }

    /// The tab went hidden.
    pub fn record_hidden(&self, now: Instant) {
        let mut state = self.inner.lock().expect("visibility lock poisoned");
        state.hidden_at = Some(now);
        state.was_hidden = true;
    }

    /// The tab regained focus.
    pub fn record_focus(&self, now: Instant) {
        let mut state = self.inner.lock().expect("visibility lock poisoned");
        if let Some(hidden_at) = state.hidden_at.take() {
            state.last_hidden_span = Some(now.duration_since(hidden_at));
        }
        state.last_focus = Some(now);
    }

    /// Whether the tab has been hidden since the last acknowledgement.
    pub fn was_hidden(&self) -> bool {
        self.inner.lock().expect("visibility lock poisoned").was_hidden
    }

    /// Timestamp of the most recent focus event, if any.
    pub fn last_focus(&self) -> Option<Instant> {
        self.inner.lock().expect("visibility lock poisoned").last_focus
    }

    /// Whether the last hidden stretch was long enough to warrant a forced
    /// session re-check on refocus.
    pub fn needs_recheck(&self, threshold: Duration) -> bool {
        let state = self.inner.lock().expect("visibility lock poisoned");
        state.was_hidden
            && state
                .last_hidden_span
                .is_some_and(|span| span >= threshold)
    }

    /// Clear the hidden flag after the caller has acted on it.
    pub fn acknowledge(&self) {
        let mut state = self.inner.lock().expect("visibility lock poisoned");
        state.was_hidden = false;
        state.last_hidden_span = None;
    }
}

impl Default for VisibilityWatcher {
    fn default() -> Self {
        Self::new()
    }
}
