//! Sage completion endpoint client.

pub mod client;

pub use client::SageClient;
