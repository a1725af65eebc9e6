//! codeagent core — transcript types, configuration, and shared helpers.
//!
//! This crate contains:
//! - **types**: Messages API wire format and the session `Transcript`
//! - **config**: `~/.codeagent/config.json` schema and loader
//! - **utils**: data-directory paths and string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use config::Config;
pub use types::{ContentBlock, LlmResponse, Message, MessageContent, Role, ToolDefinition, Transcript};
