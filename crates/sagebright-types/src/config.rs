//! Configuration types for the Sagebright session core.
//!
//! `SagebrightConfig` represents the top-level `config.toml`. All fields
//! have defaults so a missing or partial file still yields a usable
//! configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagebrightConfig {
    /// Base URL of the session/org backend.
    #[serde(default = "default_backend_base_url")]
    pub backend_base_url: String,

    /// Settle window for the stability flag, in milliseconds.
    #[serde(default = "default_stability_window_ms")]
    pub stability_window_ms: u64,

    /// How long a tab must stay hidden before a forced session re-check is
    /// recommended on refocus, in seconds.
    #[serde(default = "default_visibility_recheck_secs")]
    pub visibility_recheck_secs: u64,

    /// Persona applied when no voice parameter is present.
    #[serde(default = "default_voice")]
    pub default_voice: String,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub inactivity: InactivitySettings,
}

/// Settings for the Sage completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f64,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
}

/// Inactivity warning and hard-logout timing.
///
/// `logout_after_secs` must exceed `warn_after_secs`; loaders clamp rather
/// than reject so a bad file cannot disable the logout timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InactivitySettings {
    #[serde(default = "default_warn_after_secs")]
    pub warn_after_secs: u64,

    #[serde(default = "default_logout_after_secs")]
    pub logout_after_secs: u64,
}

fn default_backend_base_url() -> String {
    "http://localhost:8787".to_string()
}

fn default_stability_window_ms() -> u64 {
    2_000
}

fn default_visibility_recheck_secs() -> u64 {
    60
}

fn default_voice() -> String {
    "default".to_string()
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_temperature() -> f64 {
    0.7
}

fn default_llm_max_tokens() -> u32 {
    1_024
}

fn default_warn_after_secs() -> u64 {
    840
}

fn default_logout_after_secs() -> u64 {
    900
}

impl Default for SagebrightConfig {
    fn default() -> Self {
        Self {
            backend_base_url: default_backend_base_url(),
            stability_window_ms: default_stability_window_ms(),
            visibility_recheck_secs: default_visibility_recheck_secs(),
            default_voice: default_voice(),
            llm: LlmSettings::default(),
            inactivity: InactivitySettings::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

impl Default for InactivitySettings {
    fn default() -> Self {
        Self {
            warn_after_secs: default_warn_after_secs(),
            logout_after_secs: default_logout_after_secs(),
        }
    }
}
