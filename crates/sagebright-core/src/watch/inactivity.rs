//! Inactivity warning and hard-logout timers.
//!
//! Every qualifying activity event tears the previous timer pair down and
//! arms a fresh one. Events go out on a channel; the embedder decides what
//! a warning looks like and performs the actual sign-out, exactly once per
//! [`InactivityEvent::LogoutDue`]. All timer tasks are cancelled via
//! `CancellationToken`, including on drop.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use sagebright_types::config::InactivitySettings;

/// Emitted when an inactivity threshold elapses without activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactivityEvent {
    /// The warning threshold passed; the user should be nudged.
    Warning,
    /// The hard-logout threshold passed; the embedder must sign out.
    LogoutDue,
}

/// Arms warning and hard-logout timers, re-armed on every activity event.
pub struct InactivityWatcher {
    warn_after: Duration,
    logout_after: Duration,
    events: mpsc::UnboundedSender<InactivityEvent>,
    current: Mutex<Option<CancellationToken>>,
}

impl InactivityWatcher {
    /// Create a watcher that emits on `events`.
    ///
    /// The logout threshold is clamped to be strictly after the warning
    /// threshold.
    pub fn new(
        settings: &InactivitySettings,
        events: mpsc::UnboundedSender<InactivityEvent>,
    ) -> Self {
        let warn_after = Duration::from_secs(settings.warn_after_secs);
        let logout_after =
            Duration::from_secs(settings.logout_after_secs.max(settings.warn_after_secs + 1));
        Self {
            warn_after,
            logout_after,
            events,
            current: Mutex::new(None),
        }
    }

    /// A qualifying activity event occurred: clear any armed timers and
    /// arm a fresh warning/logout pair.
    ///
    /// Must be called from within a tokio runtime.
    pub fn record_activity(&self) {
        let token = CancellationToken::new();
        self.replace_token(Some(token.clone()));

        let warn_after = self.warn_after;
        let logout_gap = self.logout_after - self.warn_after;
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = sleep(warn_after) => {
                    debug!("inactivity warning threshold reached");
                    let _ = events.send(InactivityEvent::Warning);
                }
            }
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(logout_gap) => {
                    debug!("inactivity logout threshold reached");
                    let _ = events.send(InactivityEvent::LogoutDue);
                }
            }
        });
    }

    /// Cancel any armed timers without re-arming. Used on sign-out and
    /// de-authentication.
    pub fn disarm(&self) {
        self.replace_token(None);
    }

    fn replace_token(&self, next: Option<CancellationToken>) {
        let mut current = self.current.lock().expect("inactivity lock poisoned");
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        *current = next;
    }
}

impl Drop for InactivityWatcher {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::task::yield_now;
    use tokio::time::advance;

    fn settings() -> InactivitySettings {
        InactivitySettings {
            warn_after_secs: 840,
            logout_after_secs: 900,
        }
    }

    fn watcher() -> (InactivityWatcher, mpsc::UnboundedReceiver<InactivityEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (InactivityWatcher::new(&settings(), tx), rx)
    }

    async fn settle() {
        for _ in 0..5 {
            yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_warning_then_logout_after_full_timeout() {
        let (watcher, mut rx) = watcher();
        watcher.record_activity();
        settle().await;

        advance(Duration::from_secs(840)).await;
        settle().await;
        assert_eq!(rx.try_recv().unwrap(), InactivityEvent::Warning);

        advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(rx.try_recv().unwrap(), InactivityEvent::LogoutDue);

        // Exactly one logout event per arming.
        advance(Duration::from_secs(3_600)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_rearms_and_cancels_pending_timers() {
        let (watcher, mut rx) = watcher();
        watcher.record_activity();
        settle().await;

        // Re-arm just before the warning would fire.
        advance(Duration::from_secs(839)).await;
        watcher.record_activity();
        settle().await;

        advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(rx.try_recv().is_err(), "old timer pair must not fire");

        advance(Duration::from_secs(838)).await;
        settle().await;
        assert_eq!(rx.try_recv().unwrap(), InactivityEvent::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_clears_timers() {
        let (watcher, mut rx) = watcher();
        watcher.record_activity();
        settle().await;

        watcher.disarm();
        advance(Duration::from_secs(3_600)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let watcher = InactivityWatcher::new(&settings(), tx);
            watcher.record_activity();
            settle().await;
        }
        advance(Duration::from_secs(3_600)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_threshold_clamped_above_warning() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let watcher = InactivityWatcher::new(
            &InactivitySettings {
                warn_after_secs: 60,
                logout_after_secs: 30,
            },
            tx,
        );
        watcher.record_activity();
        settle().await;

        advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(rx.try_recv().unwrap(), InactivityEvent::Warning);

        advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(rx.try_recv().unwrap(), InactivityEvent::LogoutDue);
    }
}
