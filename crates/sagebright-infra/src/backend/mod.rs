//! HTTP adapters for the session backend and org directory.

pub mod org;
pub mod session;

pub use org::HttpOrgDirectory;
pub use session::HttpSessionBackend;
