//! codeagent agent — core loop, tools, and system prompt.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and built-in tools (read, write, edit, glob, grep, bash)
//! - **context**: System prompt construction
//! - **agent_loop**: The LLM ↔ tool-calling main loop

pub mod agent_loop;
pub mod context;
pub mod tools;

pub use agent_loop::{AgentLoop, AgentLoopObserver, ExchangeOutcome};
pub use tools::{Tool, ToolRegistry};
