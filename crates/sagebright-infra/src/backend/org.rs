//! HTTP implementation of the org directory seam.
//!
//! `GET {base}/orgs/by-user/{user_id}` resolves a user's organization;
//! 404 (or an empty `org_id`) means not-found, a valid terminal outcome.
//! `PATCH {base}/users/{user_id}/metadata` writes the recovered linkage
//! onto the user's profile.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use sagebright_core::auth::recovery::OrgDirectory;
use sagebright_types::error::BackendError;
use sagebright_types::org::{OrgId, OrgRef};
use sagebright_types::user::UserId;

#[derive(Debug, Deserialize)]
struct OrgLookupResponse {
    org_id: String,
    #[serde(default)]
    org_slug: String,
}

#[derive(Debug, Serialize)]
struct MetadataPatch<'a> {
    org_id: &'a OrgId,
    org_slug: &'a str,
}

/// Org directory over HTTP.
pub struct HttpOrgDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrgDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl OrgDirectory for HttpOrgDirectory {
    async fn lookup_org(&self, user_id: &UserId) -> Result<Option<OrgRef>, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/orgs/by-user/{user_id}")))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        let body: OrgLookupResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Deserialization(e.to_string()))?;

        if body.org_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(OrgRef {
            id: OrgId::from(body.org_id),
            slug: body.org_slug,
        }))
    }

    async fn patch_user_org(&self, user_id: &UserId, org: &OrgRef) -> Result<(), BackendError> {
        let patch = MetadataPatch {
            org_id: &org.id,
            org_slug: &org.slug,
        };
        let response = self
            .client
            .patch(self.url(&format!("/users/{user_id}/metadata")))
            .json(&patch)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
