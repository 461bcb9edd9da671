//! Prompt assembly for the Sage assistant.

pub mod builder;
pub mod voiceprint;

pub use builder::{PromptAssembler, PromptContext};
