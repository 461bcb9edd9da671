//! Infrastructure layer for Sagebright.
//!
//! Contains HTTP implementations of the trait seams defined in
//! `sagebright-core` (session backend, org directory, Sage completion
//! client), the configuration loader, and the runtime wiring that pins the
//! core's generics to these concrete implementations.

pub mod backend;
pub mod config;
pub mod llm;
pub mod runtime;
