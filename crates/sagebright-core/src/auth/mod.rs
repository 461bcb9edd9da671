//! Session state ownership, auth fetching, and org recovery.

pub mod fetcher;
pub mod recovery;
pub mod store;
