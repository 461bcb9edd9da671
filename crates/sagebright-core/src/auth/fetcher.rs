//! Auth fetcher: populates and clears the session store from the backend.
//!
//! Every outcome is a settled value; nothing here propagates an error to
//! the caller. A failed or unauthenticated fetch leaves the store reset,
//! and the caller gets a [`FetchOutcome`] (with a [`Notice`] only when the
//! failure came from a user-initiated forced refresh).

use std::sync::Arc;

use tracing::{debug, info, warn};

use sagebright_types::error::BackendError;
use sagebright_types::notice::Notice;
use sagebright_types::session::AuthPayload;

use crate::auth::store::SessionStore;

/// Seam to the backend session endpoint.
///
/// `fetch_session` returning `Ok(None)` means a 2xx response without a
/// session: a valid unauthenticated resting state, not an error.
/// Implementations live in `sagebright-infra`.
pub trait SessionBackend: Send + Sync {
    fn fetch_session(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<AuthPayload>, BackendError>> + Send;

    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;
}

/// Settled result of a fetch attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A prior attempt already settled unauthenticated; no network call made.
    Skipped,
    Authenticated,
    Unauthenticated,
    /// The fetch failed and the store was reset. The notice is present only
    /// for forced (user-initiated) refreshes; the first silent check stays
    /// silent.
    Failed { notice: Option<Notice> },
}

/// Fetches session state and applies it to the store.
pub struct AuthFetcher<B: SessionBackend> {
    store: Arc<SessionStore>,
    backend: B,
}

impl<B: SessionBackend> AuthFetcher<B> {
    pub fn new(store: Arc<SessionStore>, backend: B) -> Self {
        Self { store, backend }
    }

    /// Access the session store this fetcher mutates.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Fetch session state from the backend and settle the store.
    ///
    /// Skips the network call when a prior attempt concluded
    /// "unauthenticated" and `force` is unset.
    pub async fn fetch_auth_state(&self, force: bool) -> FetchOutcome {
        if !force && self.store.should_skip_fetch() {
            debug!("Auth fetch skipped: already settled unauthenticated");
            return FetchOutcome::Skipped;
        }

        self.store.set_loading(true);
        match self.backend.fetch_session().await {
            Ok(Some(payload)) => {
                let user_id = payload.user.id.clone();
                self.store.update_session_state(payload);
                info!(user_id = %user_id, "Auth fetch settled: authenticated");
                FetchOutcome::Authenticated
            }
            Ok(None) => {
                self.store.reset_state();
                debug!("Auth fetch settled: unauthenticated");
                FetchOutcome::Unauthenticated
            }
            Err(err) => {
                warn!(error = %err, force, "Auth fetch failed, resetting to unauthenticated");
                self.store.reset_state();
                let notice = force.then(|| {
                    Notice::destructive(format!("Could not refresh your session: {err}"))
                });
                FetchOutcome::Failed { notice }
            }
        }
    }

    /// Forced fetch wrapper. Returns whether the fetch settled without
    /// failing; the failure notice, if any, is logged rather than returned.
    pub async fn refresh_session(&self, reason: &str) -> bool {
        info!(reason, "Forcing session refresh");
        match self.fetch_auth_state(true).await {
            FetchOutcome::Failed { notice } => {
                if let Some(notice) = notice {
                    warn!(notice = %notice, "Session refresh failed");
                }
                false
            }
            _ => true,
        }
    }

    /// Sign out: invoke the backend, then clear local state unconditionally
    /// so the UI can never stay authenticated-looking after a logout
    /// request.
    pub async fn sign_out(&self) {
        if let Err(err) = self.backend.sign_out().await {
            warn!(error = %err, "Backend sign-out failed; clearing local state anyway");
        }
        self.store.reset_state();
    }
}
