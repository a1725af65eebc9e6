//! Agent loop — the LLM ↔ tool-calling main loop.
//!
//! One exchange starts with a user turn and runs rounds until the model
//! replies without requesting any tool. Each round sends the whole
//! transcript, appends the reply, runs every requested tool in order, and
//! answers all of them in a single user turn.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

use codeagent_core::types::{ContentBlock, Message, ToolDefinition, Transcript};
use codeagent_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::context::build_system_prompt;
use crate::tools::registry::ToolRegistry;

// ─────────────────────────────────────────────
// Observer
// ─────────────────────────────────────────────

/// Receives progress from a running exchange, in the order it happens.
///
/// Every method defaults to a no-op, so `()` works as a silent observer.
pub trait AgentLoopObserver {
    /// A text block of a model reply.
    fn on_text(&mut self, _text: &str) {}

    /// A tool is about to run.
    fn on_tool_call(&mut self, _name: &str, _input: &Value) {}

    /// A tool finished; `result` is exactly what goes back to the model.
    fn on_tool_result(&mut self, _name: &str, _result: &str) {}
}

impl AgentLoopObserver for () {}

/// Result of one completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// Number of model round-trips it took.
    pub rounds: u32,
    /// Text of the final reply.
    pub text: String,
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// Owns the transcript and drives the model through tool calls.
pub struct AgentLoop {
    /// LLM provider.
    provider: Arc<dyn LlmProvider>,
    /// Model to use (overrides provider default if set).
    model: String,
    /// Optional cap on rounds per exchange.
    max_rounds: Option<u32>,
    /// LLM request config (max_tokens).
    request_config: LlmRequestConfig,
    /// Tool registry.
    tools: ToolRegistry,
    /// Schema list, fixed for the life of the loop.
    tool_defs: Vec<ToolDefinition>,
    system_prompt: String,
    transcript: Transcript,
}

impl AgentLoop {
    /// Create a new agent loop rooted at `working_dir`.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        working_dir: PathBuf,
        model: Option<String>,
        max_rounds: Option<u32>,
        request_config: Option<LlmRequestConfig>,
        exec_timeout: Option<u64>,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        let request_config = request_config.unwrap_or_default();
        let system_prompt = build_system_prompt(&working_dir);
        let tools = ToolRegistry::builtin(working_dir, exec_timeout);
        let tool_defs = tools.get_definitions();

        info!(
            provider = provider.display_name(),
            model = %model,
            tools = tools.len(),
            max_rounds = ?max_rounds,
            "agent loop initialized"
        );

        Self {
            provider,
            model,
            max_rounds,
            request_config,
            tools,
            tool_defs,
            system_prompt,
            transcript: Transcript::new(),
        }
    }

    /// Run one exchange for the user's `text`.
    ///
    /// Every turn appended before a failure stays in the transcript, so the
    /// model still sees tool work that already happened.
    pub async fn process_direct(
        &mut self,
        text: &str,
        observer: &mut dyn AgentLoopObserver,
    ) -> Result<ExchangeOutcome> {
        self.transcript.push(Message::user(text));

        self.run_exchange(observer).await.inspect_err(|e| {
            warn!(error = %e, messages = self.transcript.len(), "exchange aborted");
        })
    }

    async fn run_exchange(&mut self, observer: &mut dyn AgentLoopObserver) -> Result<ExchangeOutcome> {
        let mut round: u32 = 0;

        loop {
            round += 1;
            if let Some(max) = self.max_rounds {
                if round > max {
                    anyhow::bail!("round limit of {max} reached without a final answer");
                }
            }
            debug!(round = round, messages = self.transcript.len(), "LLM call");

            let response = self
                .provider
                .chat(
                    &self.system_prompt,
                    self.transcript.messages(),
                    &self.tool_defs,
                    &self.model,
                    &self.request_config,
                )
                .await?;

            if response.content.is_empty() {
                warn!(round = round, "dropping empty model reply");
            } else {
                self.transcript
                    .push(Message::assistant_blocks(response.content.clone()));
            }

            let mut results = Vec::new();
            for block in &response.content {
                match block {
                    ContentBlock::Text { text } => observer.on_text(text),
                    ContentBlock::ToolUse { id, name, input } => {
                        info!(tool = %name, round = round, "executing tool call");
                        observer.on_tool_call(name, input);

                        let result = self.tools.execute(name, input).await;

                        debug!(tool = %name, result_len = result.len(), "tool result");
                        observer.on_tool_result(name, &result);
                        results.push(ContentBlock::tool_result(id.clone(), result));
                    }
                    ContentBlock::ToolResult { .. } => {
                        warn!("ignoring tool_result block in model reply");
                    }
                }
            }

            if results.is_empty() {
                info!(rounds = round, "exchange complete");
                return Ok(ExchangeOutcome {
                    rounds: round,
                    text: response.text(),
                });
            }

            self.transcript.push(Message::tool_results(results));
        }
    }

    /// Discard the whole transcript.
    pub fn clear(&mut self) {
        info!(messages = self.transcript.len(), "transcript cleared");
        self.transcript.clear();
    }

    /// The session transcript so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Get a reference to the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
