//! HTTP client for the Sage completion endpoint.
//!
//! Posts the assembled request to an OpenAI-compatible chat-completions
//! endpoint and extracts the first choice's content. Non-2xx responses
//! surface as [`SageApiError::Http`] with status and status text.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when constructing the Authorization header. It never appears in Debug
//! output or tracing logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use sagebright_core::chat::messenger::ChatHandler;
use sagebright_observe::genai_attrs;
use sagebright_types::config::LlmSettings;
use sagebright_types::sage::{SageApiError, SageRequest, SageResponse};

/// Sage completion client.
///
/// Implements [`ChatHandler`] for the messenger.
pub struct SageClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl SageClient {
    /// Create a client for the configured endpoint.
    pub fn new(settings: &LlmSettings, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
        }
    }

    /// Override the endpoint (useful for testing or proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

// SageClient intentionally does NOT derive Debug so the API key inside
// cannot leak through formatted output.

impl ChatHandler for SageClient {
    async fn deliver(&self, request: SageRequest) -> Result<String, SageApiError> {
        let span = tracing::info_span!(
            "chat",
            "gen_ai.operation.name" = genai_attrs::OP_CHAT,
            "gen_ai.provider.name" = genai_attrs::PROVIDER_SAGE,
            "gen_ai.request.model" = %request.model,
            "gen_ai.request.temperature" = request.temperature,
            "gen_ai.request.max_tokens" = request.max_tokens,
        );

        async {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(self.api_key.expose_secret())
                .json(&request)
                .send()
                .await
                .map_err(|e| SageApiError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SageApiError::Http {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("").to_string(),
                });
            }

            let body: SageResponse = response
                .json()
                .await
                .map_err(|e| SageApiError::Deserialization(e.to_string()))?;

            match body.first_content() {
                Some(content) => Ok(content.to_string()),
                None => Err(SageApiError::EmptyResponse),
            }
        }
        .instrument(span)
        .await
    }
}
