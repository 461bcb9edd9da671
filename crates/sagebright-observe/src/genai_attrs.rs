//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! These follow the OTel GenAI Semantic Conventions specification so Sage
//! completion calls are instrumented consistently. Attribute names used as
//! `tracing` span fields must be string literals at the macro call site;
//! the constants here document the canonical names and back the test that
//! keeps the literals honest.

/// The name of the operation being performed (e.g., "chat").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider.
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The model ID requested (e.g., "gpt-4o-mini").
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The sampling temperature for the request.
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

/// The maximum number of output tokens requested.
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

// --- Operation name values ---

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

// --- Provider name values ---

/// The Sage completion endpoint.
pub const PROVIDER_SAGE: &str = "sage";
