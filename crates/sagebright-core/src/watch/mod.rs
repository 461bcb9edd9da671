//! Tab visibility and user inactivity watchers.

pub mod inactivity;
pub mod visibility;

pub use inactivity::{InactivityEvent, InactivityWatcher};
pub use visibility::VisibilityWatcher;
