//! Context readiness: the derived verdict gating the chat assistant.

pub mod evaluator;
pub mod stability;

pub use evaluator::ReadinessEvaluator;
pub use stability::StabilityTracker;
