//! Readiness-gated message delivery to the Sage assistant.
//!
//! The messenger is the only path that turns user input into a completion
//! call. It re-evaluates readiness at the moment of send: a stale "ready"
//! from an earlier render never authorizes a send on its own.

use std::sync::Arc;

use tracing::{info, warn};

use sagebright_types::chat::SageMessage;
use sagebright_types::error::SendError;
use sagebright_types::readiness::format_blockers;
use sagebright_types::sage::{SageApiError, SageRequest};

use crate::auth::store::SessionStore;
use crate::chat::log::MessageLog;
use crate::prompt::builder::{PromptAssembler, PromptContext};
use crate::readiness::evaluator::ReadinessEvaluator;

/// Delivers an assembled completion request and returns the reply text.
///
/// Implemented over HTTP in `sagebright-infra`; tests substitute fakes.
pub trait ChatHandler {
    fn deliver(
        &self,
        request: SageRequest,
    ) -> impl std::future::Future<Output = Result<String, SageApiError>> + Send;
}

/// The messages recorded for one successful send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub user_message: SageMessage,
    pub reply: SageMessage,
}

/// Gates, assembles, delivers, and records chat messages.
pub struct SageMessenger<H> {
    handler: H,
    assembler: PromptAssembler,
    evaluator: Arc<ReadinessEvaluator>,
    store: Arc<SessionStore>,
    log: Arc<MessageLog>,
}

impl<H: ChatHandler> SageMessenger<H> {
    pub fn new(
        handler: H,
        assembler: PromptAssembler,
        evaluator: Arc<ReadinessEvaluator>,
        store: Arc<SessionStore>,
        log: Arc<MessageLog>,
    ) -> Self {
        Self {
            handler,
            assembler,
            evaluator,
            store,
            log,
        }
    }

    pub fn log(&self) -> &Arc<MessageLog> {
        &self.log
    }

    /// Send one user message to Sage.
    ///
    /// Readiness is re-evaluated here; a blocked send makes no network call
    /// and appends nothing to the log. A context that is ready but not yet
    /// stable proceeds with a warning.
    pub async fn send_message(&self, content: &str) -> Result<SendReceipt, SendError> {
        let report = self.evaluator.evaluate();
        if !report.is_context_ready {
            warn!(
                blockers = %format_blockers(&report.blockers),
                "send blocked: context not ready"
            );
            return Err(SendError::Blocked {
                blockers: report.blockers,
            });
        }
        if !report.is_session_stable {
            warn!("context ready but not yet stable, proceeding with send");
        }

        let snapshot = self.store.snapshot();
        let context = PromptContext::from_snapshot(&snapshot);
        let voice = self.evaluator.voice();
        let request = self.assembler.build_request(&context, &voice, content);

        let user_message = SageMessage::user(content);
        self.log.append(user_message.clone());

        let reply_text = match self.handler.deliver(request).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "sage delivery failed");
                return Err(SendError::Delivery(err.to_string()));
            }
        };

        let reply = SageMessage::sage(reply_text);
        self.log.append(reply.clone());
        info!(message_id = %reply.id, "sage reply recorded");

        Ok(SendReceipt {
            user_message,
            reply,
        })
    }
}
