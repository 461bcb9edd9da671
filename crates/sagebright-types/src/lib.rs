//! Shared domain types for the Sagebright session core.
//!
//! This crate carries no I/O: sessions, users, org references, voice
//! selections, readiness reports, chat messages, and the wire types for the
//! Sage completion endpoint. Behavior lives in `sagebright-core`.

pub mod chat;
pub mod config;
pub mod error;
pub mod notice;
pub mod org;
pub mod readiness;
pub mod sage;
pub mod session;
pub mod user;
pub mod voice;
