//! Business logic for the Sagebright session core.
//!
//! The session store is the single shared mutable resource; the auth
//! fetcher and org recovery are its only mutators. The readiness evaluator
//! and messenger observe it through immutable snapshots. HTTP
//! implementations of the trait seams live in `sagebright-infra`.

pub mod auth;
pub mod chat;
pub mod prompt;
pub mod readiness;
pub mod watch;
