//! HTTP implementation of the session backend seam.
//!
//! `GET {base}/auth/session` returns `{session, user, org?}`; a 2xx body
//! without a `session` field is the unauthenticated resting state, not an
//! error. `POST {base}/auth/signout` invalidates the current session.
//! HTTP 401, 403, and 500 all surface as [`BackendError::Http`]; the core
//! treats them identically.

use std::time::Duration;

use serde::Deserialize;

use sagebright_core::auth::fetcher::SessionBackend;
use sagebright_types::error::BackendError;
use sagebright_types::org::OrgRef;
use sagebright_types::session::{AuthPayload, Session};
use sagebright_types::user::User;

/// Wire shape of the session endpoint response.
#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    session: Option<Session>,
    user: Option<User>,
    #[serde(default)]
    org: Option<OrgRef>,
}

/// Session backend over HTTP.
pub struct HttpSessionBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionBackend {
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

impl SessionBackend for HttpSessionBackend {
    async fn fetch_session(&self) -> Result<Option<AuthPayload>, BackendError> {
        let response = self
            .client
            .get(self.url("/auth/session"))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http {
                status: status.as_u16(),
            });
        }

        let envelope: SessionEnvelope = response
            .json()
            .await
            .map_err(|e| BackendError::Deserialization(e.to_string()))?;

        match envelope.session {
            None => Ok(None),
            Some(session) => {
                let user = envelope.user.ok_or_else(|| {
                    BackendError::Deserialization(
                        "session present but user field missing".to_string(),
                    )
                })?;
                Ok(Some(AuthPayload {
                    session,
                    user,
                    org: envelope.org,
                }))
            }
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/auth/signout"))
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
