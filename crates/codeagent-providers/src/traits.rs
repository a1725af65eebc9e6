//! LLM Provider trait — the seam between the agent loop and the transport.
//!
//! The loop only ever sees this trait, which lets tests script replies with
//! an in-memory provider.

use async_trait::async_trait;
use codeagent_core::types::{LlmResponse, Message, ToolDefinition};

use crate::error::ProviderError;

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self { max_tokens: 8192 }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one round: system prompt, full transcript, and the tool schema list.
    ///
    /// # Arguments
    /// * `system`   — System instruction string.
    /// * `messages` — The whole transcript, oldest turn first.
    /// * `tools`    — Tool definitions the model may invoke.
    /// * `model`    — Model identifier (e.g. `"claude-opus-4-5"`).
    /// * `config`   — max_tokens etc.
    ///
    /// # Returns
    /// The reply's content blocks, or a `ProviderError`. Single attempt.
    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
