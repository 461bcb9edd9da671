//! The session store: the single owner of raw authentication state.
//!
//! Mutation happens only through [`SessionStore::update_session_state`] and
//! [`SessionStore::reset_state`], both `pub(crate)` so only the auth
//! fetcher and org recovery can call them. Everyone else reads through
//! [`SessionStore::snapshot`], an immutable view captured under one lock
//! acquisition.

use std::sync::RwLock;

use sagebright_types::org::OrgRef;
use sagebright_types::session::{AuthPayload, AuthSnapshot, Session};
use sagebright_types::user::User;

/// Owner of session, user, and org state plus the fetch-settled flags.
pub struct SessionStore {
    inner: RwLock<StoreInner>,
}

struct StoreInner {
    session: Option<Session>,
    user: Option<User>,
    org: Option<OrgRef>,
    is_authenticated: bool,
    ready: bool,
    loading: bool,
    has_settled: bool,
}

impl SessionStore {
    /// A fresh store: loading, nothing settled, nothing authenticated.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                session: None,
                user: None,
                org: None,
                is_authenticated: false,
                ready: false,
                loading: true,
                has_settled: false,
            }),
        }
    }

    /// Apply a successful auth fetch. All fields change together; no
    /// partial updates.
    ///
    /// Org linkage is taken from the payload's org field when present,
    /// falling back to the org id/slug in the user's metadata bag.
    pub(crate) fn update_session_state(&self, payload: AuthPayload) {
        let org = payload.org.or_else(|| org_from_metadata(&payload.user));
        let mut inner = self.inner.write().expect("session store lock poisoned");
        inner.session = Some(payload.session);
        inner.user = Some(payload.user);
        inner.org = org;
        inner.is_authenticated = true;
        inner.ready = true;
        inner.loading = false;
        inner.has_settled = true;
    }

    /// Clear all fields in one step: logout, forced logout, or a settled
    /// unauthenticated check.
    pub(crate) fn reset_state(&self) {
        let mut inner = self.inner.write().expect("session store lock poisoned");
        inner.session = None;
        inner.user = None;
        inner.org = None;
        inner.is_authenticated = false;
        inner.ready = true;
        inner.loading = false;
        inner.has_settled = true;
    }

    /// Mark a fetch as in flight (or finished, on the error paths that
    /// bypass the two mutators above).
    pub(crate) fn set_loading(&self, loading: bool) {
        let mut inner = self.inner.write().expect("session store lock poisoned");
        inner.loading = loading;
    }

    /// Whether a non-forced fetch should be skipped: a prior attempt has
    /// already settled on "unauthenticated".
    pub(crate) fn should_skip_fetch(&self) -> bool {
        let inner = self.inner.read().expect("session store lock poisoned");
        inner.has_settled && !inner.is_authenticated
    }

    /// Immutable view of the current state.
    pub fn snapshot(&self) -> AuthSnapshot {
        let inner = self.inner.read().expect("session store lock poisoned");
        AuthSnapshot {
            session: inner.session.clone(),
            user: inner.user.clone(),
            org: inner.org.clone(),
            is_authenticated: inner.is_authenticated,
            ready: inner.ready,
            loading: inner.loading,
            has_settled: inner.has_settled,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an org reference from the user's metadata bag, when both the id is
/// present and non-empty.
fn org_from_metadata(user: &User) -> Option<OrgRef> {
    let org_id = user.metadata.org_id.clone().filter(|id| !id.is_empty())?;
    Some(OrgRef {
        id: org_id,
        slug: user.metadata.org_slug.clone().unwrap_or_default(),
    })
}
