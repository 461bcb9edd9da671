//! The context readiness evaluator.
//!
//! Pure derivation over the session store snapshot plus the parsed voice
//! parameter: no caching across input changes, recomputed on every call.
//! The evaluator owns the debounce state for the stability flag and the
//! `ready_since` bookkeeping; everything else in the report is a function
//! of current inputs.
//!
//! Voice policy: an unknown requested voice is a real blocker here (strict
//! gating). The prompt assembler independently falls back to the default
//! voiceprint, so any prompt that does get built is still well-formed.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use sagebright_types::readiness::{Blocker, ReadinessReport};
use sagebright_types::voice::VoiceSelection;

use crate::auth::store::SessionStore;
use crate::prompt::voiceprint;
use crate::readiness::stability::StabilityTracker;

/// Recomputes the readiness verdict from the store and voice parameter.
pub struct ReadinessEvaluator {
    store: Arc<SessionStore>,
    inner: Mutex<EvalInner>,
}

struct EvalInner {
    voice: VoiceSelection,
    stability: StabilityTracker,
    ready_since: Option<DateTime<Utc>>,
}

impl ReadinessEvaluator {
    pub fn new(store: Arc<SessionStore>, stability_window: Duration) -> Self {
        Self {
            store,
            inner: Mutex::new(EvalInner {
                voice: VoiceSelection::Default,
                stability: StabilityTracker::new(stability_window),
                ready_since: None,
            }),
        }
    }

    /// Parse and record the `voice` query parameter against the known
    /// persona set.
    pub fn set_voice_param(&self, raw: Option<&str>) {
        let selection = VoiceSelection::parse(raw, voiceprint::persona_names());
        let mut inner = self.inner.lock().expect("evaluator lock poisoned");
        inner.voice = selection;
    }

    /// The currently recorded voice selection.
    pub fn voice(&self) -> VoiceSelection {
        self.inner
            .lock()
            .expect("evaluator lock poisoned")
            .voice
            .clone()
    }

    /// Recompute the readiness verdict now.
    pub fn evaluate(&self) -> ReadinessReport {
        self.evaluate_at(Instant::now())
    }

    /// Recompute the verdict at an injected instant (for tests).
    pub fn evaluate_at(&self, now: Instant) -> ReadinessReport {
        let snapshot = self.store.snapshot();
        let mut inner = self.inner.lock().expect("evaluator lock poisoned");

        let is_session_ready =
            snapshot.session.is_some() && !snapshot.loading && snapshot.has_settled;
        let is_org_ready = snapshot.org_id().is_some();
        let is_voice_ready = inner.voice.is_ready();
        let is_context_ready = is_session_ready && is_org_ready && is_voice_ready;

        let is_session_stable = inner.stability.observe(is_context_ready, now);

        if is_context_ready {
            if inner.ready_since.is_none() {
                inner.ready_since = Some(Utc::now());
            }
        } else {
            inner.ready_since = None;
        }

        // Stable order: session, org, voice.
        let mut blockers = Vec::new();
        if !is_session_ready {
            blockers.push(Blocker::Session);
        }
        if !is_org_ready {
            blockers.push(Blocker::Org);
        }
        if !is_voice_ready {
            blockers.push(Blocker::Voice);
        }

        ReadinessReport {
            is_context_ready,
            is_session_ready,
            is_org_ready,
            is_voice_ready,
            is_session_stable,
            blockers,
            ready_since: inner.ready_since,
        }
    }
}
