//! Session and auth-state types.
//!
//! A [`Session`] is the opaque handle returned by the session backend.
//! [`AuthPayload`] is what a successful session fetch yields; [`AuthSnapshot`]
//! is the immutable view of the session store handed to read-only observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::org::OrgRef;
use crate::user::User;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// An authenticated session as reported by the session backend.
///
/// Opaque to this core beyond its id and expiry; created on a successful
/// auth fetch, destroyed on sign-out or expiry-triggered reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired relative to `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The complete result of a successful session fetch.
///
/// Org linkage may be absent immediately after signup (the "missing org"
/// condition); org recovery backfills it asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub session: Session,
    pub user: User,
    pub org: Option<OrgRef>,
}

/// Immutable view of the session store.
///
/// All fields are captured under a single lock acquisition, so a snapshot is
/// never torn: `is_authenticated` implies `user` and `session` are present,
/// and a reset state clears everything at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub user: Option<User>,
    pub org: Option<OrgRef>,
    pub is_authenticated: bool,
    /// False only before the first fetch settles.
    pub ready: bool,
    /// True while an auth fetch is in flight.
    pub loading: bool,
    /// Whether any auth fetch has completed (successfully or not).
    pub has_settled: bool,
}

impl AuthSnapshot {
    /// User id, when a user is present.
    pub fn user_id(&self) -> Option<&crate::user::UserId> {
        self.user.as_ref().map(|u| &u.id)
    }

    /// Org id, when org linkage is present and non-empty.
    pub fn org_id(&self) -> Option<&crate::org::OrgId> {
        self.org.as_ref().map(|o| &o.id).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::{OrgId, OrgRef};
    use crate::user::{User, UserId, UserMetadata, UserRole};

    fn test_user() -> User {
        User {
            id: UserId::new(),
            role: UserRole::Employee,
            metadata: UserMetadata::default(),
        }
    }

    #[test]
    fn test_session_id_display_parse() {
        let id = SessionId::new();
        let s = id.to_string();
        let parsed: SessionId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session {
            id: SessionId::new(),
            expires_at: now + chrono::Duration::hours(1),
        };
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + chrono::Duration::hours(2)));
    }

    #[test]
    fn test_snapshot_org_id_filters_empty() {
        let snapshot = AuthSnapshot {
            session: None,
            user: Some(test_user()),
            org: Some(OrgRef {
                id: OrgId::from("".to_string()),
                slug: "acme".to_string(),
            }),
            is_authenticated: true,
            ready: true,
            loading: false,
            has_settled: true,
        };
        assert!(snapshot.org_id().is_none());
    }

    #[test]
    fn test_auth_payload_serde_roundtrip() {
        let payload = AuthPayload {
            session: Session {
                id: SessionId::new(),
                expires_at: Utc::now(),
            },
            user: test_user(),
            org: Some(OrgRef {
                id: OrgId::from("org_01".to_string()),
                slug: "acme".to_string(),
            }),
        };
        let json = serde_json::to_string(&payload).unwrap();
        let parsed: AuthPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, payload);
    }
}
