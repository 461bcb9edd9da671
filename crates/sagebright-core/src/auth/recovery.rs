//! Org recovery: backfills missing organization linkage for an otherwise
//! authenticated user.
//!
//! The automatic path runs at most once per authenticated session: it ends
//! in `Recovered` or `Exhausted`, and both park the machine until sign-out
//! resets it. A transport failure also parks it — repeated automatic
//! triggers with unchanged inputs must not re-issue the lookup. The manual
//! path ignores the parked state so a user-triggered retry always gets a
//! fresh attempt.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use sagebright_types::error::BackendError;
use sagebright_types::notice::Notice;
use sagebright_types::org::OrgRef;
use sagebright_types::user::UserId;

use crate::auth::fetcher::{AuthFetcher, SessionBackend};
use crate::auth::store::SessionStore;

/// Seam to the org directory: lookup by user id and metadata patching.
///
/// `lookup_org` returning `Ok(None)` is a valid terminal outcome
/// (not-found), not an error.
pub trait OrgDirectory: Send + Sync {
    fn lookup_org(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<OrgRef>, BackendError>> + Send;

    fn patch_user_org(
        &self,
        user_id: &UserId,
        org: &OrgRef,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;
}

/// Where the recovery machine stands for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    NotStarted,
    InProgress,
    Recovered,
    Exhausted,
}

/// Settled result of a recovery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    /// The trigger condition did not hold (no user, org already present,
    /// or the user signed out mid-attempt).
    NotNeeded,
    /// The machine is parked in a terminal state; the automatic path will
    /// not retry.
    AlreadyTerminal,
    Recovered { org: OrgRef },
    Exhausted,
}

impl RecoveryOutcome {
    /// The user-facing notice for this outcome, if one should be shown.
    ///
    /// The automatic path surfaces only exhaustion; the manual path shows
    /// whatever this returns.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            RecoveryOutcome::Recovered { org } => Some(Notice::info(format!(
                "Reconnected you to your organization ({}).",
                org.slug
            ))),
            RecoveryOutcome::Exhausted => Some(Notice::warning(
                "We couldn't find an organization for your account. \
                 Please contact your administrator.",
            )),
            RecoveryOutcome::NotNeeded | RecoveryOutcome::AlreadyTerminal => None,
        }
    }
}

/// Backfills org linkage from the directory when the session lacks it.
pub struct OrgRecovery<D: OrgDirectory> {
    store: Arc<SessionStore>,
    directory: D,
    state: Mutex<RecoveryState>,
}

impl<D: OrgDirectory> OrgRecovery<D> {
    pub fn new(store: Arc<SessionStore>, directory: D) -> Self {
        Self {
            store,
            directory,
            state: Mutex::new(RecoveryState::NotStarted),
        }
    }

    pub fn state(&self) -> RecoveryState {
        *self.state.lock().expect("recovery state lock poisoned")
    }

    fn set_state(&self, state: RecoveryState) {
        *self.state.lock().expect("recovery state lock poisoned") = state;
    }

    /// Whether the automatic trigger condition currently holds.
    pub fn should_run(&self) -> bool {
        let snapshot = self.store.snapshot();
        snapshot.is_authenticated
            && snapshot.user_id().is_some()
            && snapshot.org_id().is_none()
            && self.state() == RecoveryState::NotStarted
    }

    /// Automatic recovery path. Runs at most once per session.
    pub async fn run<B: SessionBackend>(&self, fetcher: &AuthFetcher<B>) -> RecoveryOutcome {
        {
            let snapshot = self.store.snapshot();
            if !snapshot.is_authenticated
                || snapshot.user_id().is_none()
                || snapshot.org_id().is_some()
            {
                return RecoveryOutcome::NotNeeded;
            }
            match self.state() {
                RecoveryState::NotStarted => {}
                RecoveryState::InProgress => return RecoveryOutcome::NotNeeded,
                RecoveryState::Recovered | RecoveryState::Exhausted => {
                    return RecoveryOutcome::AlreadyTerminal;
                }
            }
        }

        self.set_state(RecoveryState::InProgress);
        let outcome = self.attempt(fetcher).await;
        self.settle(&outcome);
        outcome
    }

    /// Manual, user-triggered retry. Ignores a parked terminal state but
    /// still refuses to overlap an in-flight attempt.
    pub async fn recover_now<B: SessionBackend>(
        &self,
        fetcher: &AuthFetcher<B>,
    ) -> RecoveryOutcome {
        if self.state() == RecoveryState::InProgress {
            return RecoveryOutcome::NotNeeded;
        }
        let snapshot = self.store.snapshot();
        if !snapshot.is_authenticated || snapshot.user_id().is_none() {
            return RecoveryOutcome::NotNeeded;
        }
        if snapshot.org_id().is_some() {
            return RecoveryOutcome::NotNeeded;
        }

        self.set_state(RecoveryState::InProgress);
        let outcome = self.attempt(fetcher).await;
        self.settle(&outcome);
        outcome
    }

    /// Re-enable the automatic path. Called on sign-out.
    pub fn reset(&self) {
        self.set_state(RecoveryState::NotStarted);
    }

    fn settle(&self, outcome: &RecoveryOutcome) {
        let state = match outcome {
            RecoveryOutcome::Recovered { .. } => RecoveryState::Recovered,
            RecoveryOutcome::Exhausted => RecoveryState::Exhausted,
            // Aborted mid-flight (e.g. sign-out raced us): leave retryable.
            RecoveryOutcome::NotNeeded | RecoveryOutcome::AlreadyTerminal => {
                RecoveryState::NotStarted
            }
        };
        self.set_state(state);
    }

    async fn attempt<B: SessionBackend>(&self, fetcher: &AuthFetcher<B>) -> RecoveryOutcome {
        // (a) a forced refresh may already surface the org from fresher
        // session metadata.
        fetcher
            .refresh_session("org recovery: re-read session metadata")
            .await;

        let snapshot = self.store.snapshot();
        if !snapshot.is_authenticated {
            // Sign-out won the race; do not write anything.
            return RecoveryOutcome::NotNeeded;
        }
        if let Some(org) = snapshot.org.clone().filter(|o| !o.id.is_empty()) {
            info!(org_id = %org.id, "Org linkage present after refresh");
            return RecoveryOutcome::Recovered { org };
        }
        let Some(user_id) = snapshot.user_id().cloned() else {
            return RecoveryOutcome::NotNeeded;
        };

        // (b) directory lookup by user id.
        let org = match self.directory.lookup_org(&user_id).await {
            Ok(Some(org)) => org,
            Ok(None) => {
                info!(user_id = %user_id, "Org lookup found nothing; recovery exhausted");
                return RecoveryOutcome::Exhausted;
            }
            Err(err) => {
                warn!(error = %err, user_id = %user_id, "Org lookup failed; recovery exhausted");
                return RecoveryOutcome::Exhausted;
            }
        };

        // (c) patch the user's metadata, then force a refresh so the store
        // observes the patched value.
        if let Err(err) = self.directory.patch_user_org(&user_id, &org).await {
            warn!(error = %err, user_id = %user_id, "Org metadata patch failed");
            return RecoveryOutcome::Exhausted;
        }
        fetcher
            .refresh_session("org recovery: observe patched metadata")
            .await;

        info!(user_id = %user_id, org_id = %org.id, "Org linkage recovered");
        RecoveryOutcome::Recovered { org }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sagebright_types::org::OrgId;
    use sagebright_types::session::{AuthPayload, Session, SessionId};
    use sagebright_types::user::{User, UserMetadata, UserRole};

    struct FakeBackend {
        responses: Mutex<VecDeque<Option<AuthPayload>>>,
    }

    impl SessionBackend for FakeBackend {
        async fn fetch_session(&self) -> Result<Option<AuthPayload>, BackendError> {
            let mut responses = self.responses.lock().unwrap();
            // Repeat the last response once the queue drains.
            if responses.len() > 1 {
                Ok(responses.pop_front().unwrap())
            } else {
                Ok(responses.front().cloned().flatten())
            }
        }

        async fn sign_out(&self) -> Result<(), BackendError> {
            Ok(())
        }
    }

    struct FakeDirectory {
        lookup_results: Mutex<VecDeque<Result<Option<OrgRef>, BackendError>>>,
        lookup_calls: AtomicUsize,
        patches: Mutex<Vec<(UserId, OrgRef)>>,
    }

    impl FakeDirectory {
        fn new(results: Vec<Result<Option<OrgRef>, BackendError>>) -> Self {
            Self {
                lookup_results: Mutex::new(results.into()),
                lookup_calls: AtomicUsize::new(0),
                patches: Mutex::new(Vec::new()),
            }
        }

        fn lookup_calls(&self) -> usize {
            self.lookup_calls.load(Ordering::SeqCst)
        }
    }

    impl OrgDirectory for FakeDirectory {
        async fn lookup_org(&self, _user_id: &UserId) -> Result<Option<OrgRef>, BackendError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            self.lookup_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }

        async fn patch_user_org(
            &self,
            user_id: &UserId,
            org: &OrgRef,
        ) -> Result<(), BackendError> {
            self.patches
                .lock()
                .unwrap()
                .push((user_id.clone(), org.clone()));
            Ok(())
        }
    }

    fn org() -> OrgRef {
        OrgRef {
            id: OrgId::from("org_02"),
            slug: "acme".to_string(),
        }
    }

    fn payload(user_id: &UserId, org: Option<OrgRef>) -> AuthPayload {
        AuthPayload {
            session: Session {
                id: SessionId::new(),
                expires_at: Utc::now() + chrono::Duration::hours(1),
            },
            user: User {
                id: user_id.clone(),
                role: UserRole::Employee,
                metadata: UserMetadata::default(),
            },
            org,
        }
    }

    /// Store authenticated without org; backend serves `responses` on each
    /// subsequent (forced) refresh.
    fn setup(
        responses: Vec<Option<AuthPayload>>,
        directory: FakeDirectory,
    ) -> (Arc<SessionStore>, AuthFetcher<FakeBackend>, OrgRecovery<FakeDirectory>, UserId) {
        let user_id = UserId::new();
        let store = Arc::new(SessionStore::new());
        store.update_session_state(payload(&user_id, None));

        let backend = FakeBackend {
            responses: Mutex::new(responses.into()),
        };
        let fetcher = AuthFetcher::new(Arc::clone(&store), backend);
        let recovery = OrgRecovery::new(Arc::clone(&store), directory);
        (store, fetcher, recovery, user_id)
    }

    #[tokio::test]
    async fn test_recovers_via_directory_lookup_and_patch() {
        let user_id = UserId::new();
        // First refresh still lacks the org; after the patch, the refreshed
        // session carries it.
        let (store, fetcher, recovery, _) = setup(
            vec![
                Some(payload(&user_id, None)),
                Some(payload(&user_id, Some(org()))),
            ],
            FakeDirectory::new(vec![Ok(Some(org()))]),
        );

        let outcome = recovery.run(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::Recovered { org: org() });
        assert_eq!(recovery.state(), RecoveryState::Recovered);
        assert_eq!(recovery.directory.patches.lock().unwrap().len(), 1);
        assert!(store.snapshot().org_id().is_some());
    }

    #[tokio::test]
    async fn test_refresh_alone_can_recover() {
        let user_id = UserId::new();
        let (_, fetcher, recovery, _) = setup(
            vec![Some(payload(&user_id, Some(org())))],
            FakeDirectory::new(vec![]),
        );

        let outcome = recovery.run(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::Recovered { org: org() });
        // The directory was never consulted.
        assert_eq!(recovery.directory.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_not_found_exhausts() {
        let user_id = UserId::new();
        let (_, fetcher, recovery, _) = setup(
            vec![Some(payload(&user_id, None))],
            FakeDirectory::new(vec![Ok(None)]),
        );

        let outcome = recovery.run(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::Exhausted);
        assert_eq!(recovery.state(), RecoveryState::Exhausted);
        assert!(outcome.notice().is_some());
    }

    #[tokio::test]
    async fn test_exhausted_is_terminal_for_automatic_path() {
        // P6: repeated automatic triggers with unchanged inputs must not
        // re-issue the lookup.
        let user_id = UserId::new();
        let (_, fetcher, recovery, _) = setup(
            vec![Some(payload(&user_id, None))],
            FakeDirectory::new(vec![Ok(None), Ok(Some(org()))]),
        );

        recovery.run(&fetcher).await;
        assert_eq!(recovery.directory.lookup_calls(), 1);

        let outcome = recovery.run(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::AlreadyTerminal);
        assert_eq!(recovery.directory.lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_manual_retry_ignores_exhausted() {
        let user_id = UserId::new();
        let (_, fetcher, recovery, _) = setup(
            vec![
                Some(payload(&user_id, None)),
                Some(payload(&user_id, None)),
                Some(payload(&user_id, Some(org()))),
            ],
            FakeDirectory::new(vec![Ok(None), Ok(Some(org()))]),
        );

        recovery.run(&fetcher).await;
        assert_eq!(recovery.state(), RecoveryState::Exhausted);

        let outcome = recovery.recover_now(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::Recovered { org: org() });
        assert_eq!(recovery.directory.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_reset_reenables_automatic_path() {
        let user_id = UserId::new();
        let (store, fetcher, recovery, _) = setup(
            vec![Some(payload(&user_id, None))],
            FakeDirectory::new(vec![Ok(None), Ok(None)]),
        );

        recovery.run(&fetcher).await;
        assert_eq!(recovery.state(), RecoveryState::Exhausted);

        recovery.reset();
        assert_eq!(recovery.state(), RecoveryState::NotStarted);
        // Store is still authenticated without an org, so it should run.
        assert!(store.snapshot().is_authenticated);
        assert!(recovery.should_run());
    }

    #[tokio::test]
    async fn test_lookup_failure_parks_machine() {
        let user_id = UserId::new();
        let (_, fetcher, recovery, _) = setup(
            vec![Some(payload(&user_id, None))],
            FakeDirectory::new(vec![Err(BackendError::Transport("reset".to_string()))]),
        );

        let outcome = recovery.run(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::Exhausted);
        assert_eq!(recovery.state(), RecoveryState::Exhausted);
    }

    #[tokio::test]
    async fn test_no_run_when_org_already_present() {
        let user_id = UserId::new();
        let store = Arc::new(SessionStore::new());
        store.update_session_state(payload(&user_id, Some(org())));

        let fetcher = AuthFetcher::new(
            Arc::clone(&store),
            FakeBackend { responses: Mutex::new(VecDeque::new()) },
        );
        let recovery = OrgRecovery::new(Arc::clone(&store), FakeDirectory::new(vec![]));

        assert!(!recovery.should_run());
        let outcome = recovery.run(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::NotNeeded);
        assert_eq!(recovery.state(), RecoveryState::NotStarted);
    }

    #[tokio::test]
    async fn test_sign_out_race_aborts_without_writes() {
        let user_id = UserId::new();
        // The forced refresh comes back unauthenticated: sign-out won.
        let (_, fetcher, recovery, _) = setup(
            vec![None],
            FakeDirectory::new(vec![Ok(Some(org()))]),
        );

        let outcome = recovery.run(&fetcher).await;
        assert_eq!(outcome, RecoveryOutcome::NotNeeded);
        assert_eq!(recovery.state(), RecoveryState::NotStarted);
        assert_eq!(recovery.directory.lookup_calls(), 0);
        let _ = user_id;
    }
}
