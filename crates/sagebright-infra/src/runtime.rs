//! Runtime wiring for the Sagebright session core.
//!
//! `SagebrightRuntime` pins the core's generics to the HTTP implementations
//! and owns the shared state: the session store, fetcher, org recovery,
//! readiness evaluator, messenger, and watchers. The embedding UI drives it
//! by forwarding lifecycle events (startup, refocus, activity, logout-due)
//! and reading readiness reports.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use secrecy::SecretString;
use tokio::sync::mpsc;
use tracing::{info, warn};

use sagebright_core::auth::fetcher::{AuthFetcher, FetchOutcome};
use sagebright_core::auth::recovery::OrgRecovery;
use sagebright_core::auth::store::SessionStore;
use sagebright_core::chat::log::MessageLog;
use sagebright_core::chat::messenger::SageMessenger;
use sagebright_core::prompt::builder::PromptAssembler;
use sagebright_core::prompt::voiceprint;
use sagebright_core::readiness::evaluator::ReadinessEvaluator;
use sagebright_core::watch::inactivity::{InactivityEvent, InactivityWatcher};
use sagebright_core::watch::visibility::VisibilityWatcher;
use sagebright_types::config::SagebrightConfig;
use sagebright_types::readiness::ReadinessReport;

use crate::backend::{HttpOrgDirectory, HttpSessionBackend};
use crate::config::load_config;
use crate::llm::SageClient;

/// Concrete type aliases pinning the core generics to the HTTP implementations.
pub type HttpAuthFetcher = AuthFetcher<HttpSessionBackend>;
pub type HttpOrgRecovery = OrgRecovery<HttpOrgDirectory>;
pub type HttpSageMessenger = SageMessenger<SageClient>;

/// Shared runtime state wiring all components together.
pub struct SagebrightRuntime {
    config: SagebrightConfig,
    pub store: Arc<SessionStore>,
    pub fetcher: Arc<HttpAuthFetcher>,
    pub recovery: Arc<HttpOrgRecovery>,
    pub evaluator: Arc<ReadinessEvaluator>,
    pub messenger: HttpSageMessenger,
    pub log: Arc<MessageLog>,
    pub visibility: VisibilityWatcher,
    pub inactivity: InactivityWatcher,
}

impl SagebrightRuntime {
    /// Load configuration from `{data_dir}/config.toml` and wire the runtime.
    ///
    /// Returns the runtime plus the channel on which inactivity events
    /// arrive; the embedder must call [`SagebrightRuntime::sign_out`]
    /// exactly once per [`InactivityEvent::LogoutDue`].
    pub async fn init(
        data_dir: &Path,
        sage_api_key: SecretString,
    ) -> anyhow::Result<(Self, mpsc::UnboundedReceiver<InactivityEvent>)> {
        tokio::fs::create_dir_all(data_dir).await?;
        let config = load_config(data_dir).await;
        Ok(Self::new(config, sage_api_key))
    }

    /// Wire the runtime from an already-loaded configuration.
    pub fn new(
        config: SagebrightConfig,
        sage_api_key: SecretString,
    ) -> (Self, mpsc::UnboundedReceiver<InactivityEvent>) {
        let store = Arc::new(SessionStore::new());
        let fetcher = Arc::new(AuthFetcher::new(
            Arc::clone(&store),
            HttpSessionBackend::new(&config.backend_base_url),
        ));
        let recovery = Arc::new(OrgRecovery::new(
            Arc::clone(&store),
            HttpOrgDirectory::new(&config.backend_base_url),
        ));
        let evaluator = Arc::new(ReadinessEvaluator::new(
            Arc::clone(&store),
            Duration::from_millis(config.stability_window_ms),
        ));
        let log = Arc::new(MessageLog::new());
        let messenger = SageMessenger::new(
            SageClient::new(&config.llm, sage_api_key),
            PromptAssembler::new(config.llm.clone()),
            Arc::clone(&evaluator),
            Arc::clone(&store),
            Arc::clone(&log),
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let inactivity = InactivityWatcher::new(&config.inactivity, events_tx);

        let runtime = Self {
            config,
            store,
            fetcher,
            recovery,
            evaluator,
            messenger,
            log,
            visibility: VisibilityWatcher::new(),
            inactivity,
        };
        (runtime, events_rx)
    }

    pub fn config(&self) -> &SagebrightConfig {
        &self.config
    }

    /// Record the voice query parameter.
    ///
    /// An absent parameter falls back to the configured default persona;
    /// an unrecognized configured default is ignored with a warning rather
    /// than poisoning readiness for every visitor.
    pub fn set_voice_param(&self, raw: Option<&str>) {
        let configured = match raw {
            Some(_) => raw,
            None if voiceprint::is_known(&self.config.default_voice) => {
                Some(self.config.default_voice.as_str())
            }
            None => {
                warn!(
                    default_voice = %self.config.default_voice,
                    "Configured default voice is not a known persona; ignoring"
                );
                None
            }
        };
        self.evaluator.set_voice_param(configured);
    }

    /// Startup sequence: silent auth fetch, then automatic org recovery
    /// when the fetched session lacks org linkage.
    pub async fn start(&self) -> ReadinessReport {
        let outcome = self.fetcher.fetch_auth_state(false).await;
        if outcome == FetchOutcome::Authenticated {
            self.inactivity.record_activity();
            if self.recovery.should_run() {
                let recovered = self.recovery.run(self.fetcher.as_ref()).await;
                if let Some(notice) = recovered.notice() {
                    info!(notice = %notice, "Org recovery settled at startup");
                }
            }
        }
        self.evaluator.evaluate()
    }

    /// The tab regained focus: force a session re-check when it was hidden
    /// long enough, then re-run recovery if the refreshed session still
    /// lacks an org.
    pub async fn handle_refocus(&self) {
        self.visibility.record_focus(Instant::now());
        let threshold = Duration::from_secs(self.config.visibility_recheck_secs);
        if !self.visibility.needs_recheck(threshold) {
            return;
        }
        self.visibility.acknowledge();
        self.fetcher.refresh_session("tab refocus after hidden period").await;
        if self.recovery.should_run() {
            self.recovery.run(self.fetcher.as_ref()).await;
        }
    }

    /// The tab went hidden.
    pub fn handle_hidden(&self) {
        self.visibility.record_hidden(Instant::now());
    }

    /// A qualifying user input event occurred.
    pub fn handle_activity(&self) {
        if self.store.snapshot().is_authenticated {
            self.inactivity.record_activity();
        }
    }

    /// Sign out: backend invalidation, unconditional local reset, recovery
    /// re-enable, log clear, and timer teardown.
    pub async fn sign_out(&self) {
        self.fetcher.sign_out().await;
        self.recovery.reset();
        self.log.clear();
        self.inactivity.disarm();
        info!("Signed out; local state reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagebright_types::readiness::Blocker;
    use sagebright_types::voice::VoiceSelection;

    fn runtime() -> SagebrightRuntime {
        let (runtime, _rx) = SagebrightRuntime::new(
            SagebrightConfig::default(),
            SecretString::from("sk-test"),
        );
        runtime
    }

    #[tokio::test]
    async fn test_fresh_runtime_reports_unready() {
        let runtime = runtime();
        let report = runtime.evaluator.evaluate();
        assert!(!report.is_context_ready);
        assert_eq!(report.blockers, vec![Blocker::Session, Blocker::Org]);
    }

    #[tokio::test]
    async fn test_voice_param_falls_back_to_configured_default() {
        let runtime = runtime();
        runtime.set_voice_param(None);
        assert_eq!(
            runtime.evaluator.voice(),
            VoiceSelection::Named { name: "default".to_string() }
        );

        runtime.set_voice_param(Some("warm"));
        assert_eq!(
            runtime.evaluator.voice(),
            VoiceSelection::Named { name: "warm".to_string() }
        );
    }

    #[tokio::test]
    async fn test_unknown_configured_default_is_ignored() {
        let (runtime, _rx) = SagebrightRuntime::new(
            SagebrightConfig {
                default_voice: "pirate".to_string(),
                ..SagebrightConfig::default()
            },
            SecretString::from("sk-test"),
        );
        runtime.set_voice_param(None);
        // Falls back to the built-in default rather than blocking on the
        // misconfigured persona.
        assert_eq!(runtime.evaluator.voice(), VoiceSelection::Default);
        assert!(runtime.evaluator.voice().is_ready());
    }

    #[tokio::test]
    async fn test_explicit_unknown_voice_still_blocks() {
        let runtime = runtime();
        runtime.set_voice_param(Some("pirate"));
        assert!(!runtime.evaluator.voice().is_ready());
    }
}
