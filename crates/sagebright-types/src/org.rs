//! Organization reference types.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Organization identifier as issued by the backend.
///
/// Kept as an opaque string rather than a UUID: readiness treats an empty
/// id the same as a missing one, and the backend owns the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(String);

impl OrgId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for OrgId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrgId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Organization linkage on a user: id plus URL slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgRef {
    pub id: OrgId,
    pub slug: String,
}
