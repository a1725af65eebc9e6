//! HTTP client for the Messages API.
//!
//! One POST per round to `{api_base}/v1/messages`. The API key is looked up
//! in the environment on every call, so rotating the variable mid-session
//! takes effect on the next round. An unset key is sent as an empty header
//! and the API's authorization error is surfaced to the user as-is.

use async_trait::async_trait;
use tracing::{debug, error};

use codeagent_core::config::schema::ProviderConfig;
use codeagent_core::types::{
    LlmResponse, Message, MessagesRequest, MessagesResponse, ToolDefinition,
};

use crate::error::ProviderError;
use crate::traits::{LlmProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// Messages API provider backed by `reqwest`.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled). No request timeout.
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.anthropic.com"`).
    api_base: String,
    /// Environment variable holding the API key.
    api_key_env: String,
    /// `anthropic-version` header value.
    anthropic_version: String,
    /// Default model for this provider instance.
    default_model: String,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("api_key_env", &self.api_key_env)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new provider from the `provider` config section.
    pub fn new(config: &ProviderConfig, model: &str) -> Self {
        HttpProvider {
            client: reqwest::Client::new(),
            api_base: config.api_base.clone(),
            api_key_env: config.api_key_env.clone(),
            anthropic_version: config.anthropic_version.clone(),
            default_model: model.to_string(),
        }
    }

    /// Build the full messages endpoint URL.
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base.trim_end_matches('/'))
    }

    /// Current API key, or an empty string when the variable is unset.
    fn api_key(&self) -> String {
        std::env::var(&self.api_key_env).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        debug!(
            model = %model,
            messages = messages.len(),
            tools = tools.len(),
            "Calling LLM"
        );

        let body = MessagesRequest {
            model,
            max_tokens: config.max_tokens,
            system,
            messages,
            tools,
        };

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.api_key())
            .header("anthropic-version", &self.anthropic_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ProviderError::Http(e)
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(status = %status, body = %text, "API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse LLM response");
            ProviderError::Decode(e)
        })?;

        debug!(
            id = parsed.id.as_deref().unwrap_or("?"),
            blocks = parsed.content.len(),
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("?"),
            input_tokens = parsed.usage.as_ref().map_or(0, |u| u.input_tokens),
            output_tokens = parsed.usage.as_ref().map_or(0, |u| u.output_tokens),
            "LLM response received"
        );

        Ok(parsed.into())
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        "Anthropic"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use codeagent_core::types::ContentBlock;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Each test uses its own key variable so parallel tests don't collide.
    fn make_config(api_base: &str, key_env: &str) -> ProviderConfig {
        ProviderConfig {
            api_base: api_base.to_string(),
            api_key_env: key_env.to_string(),
            ..Default::default()
        }
    }

    fn text_reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    // ── Unit tests ──

    #[test]
    fn test_messages_url_trailing_slash() {
        let provider = HttpProvider::new(&make_config("https://api.anthropic.com/", "K"), "m");
        assert_eq!(provider.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_messages_url_no_trailing_slash() {
        let provider = HttpProvider::new(&make_config("http://localhost:8080", "K"), "m");
        assert_eq!(provider.messages_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_missing_key_is_empty() {
        let provider = HttpProvider::new(
            &make_config("http://x", "CODEAGENT_TEST_KEY_THAT_IS_NEVER_SET"),
            "m",
        );
        assert_eq!(provider.api_key(), "");
    }

    #[test]
    fn test_default_model() {
        let provider = HttpProvider::new(&ProviderConfig::default(), "claude-opus-4-5");
        assert_eq!(provider.default_model(), "claude-opus-4-5");
        assert_eq!(provider.display_name(), "Anthropic");
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_chat_success_sends_headers() {
        let mock_server = MockServer::start().await;
        std::env::set_var("CODEAGENT_TEST_KEY_SUCCESS", "sk-test-123");

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test-123"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Hello!")))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(
            &make_config(&mock_server.uri(), "CODEAGENT_TEST_KEY_SUCCESS"),
            "claude-opus-4-5",
        );
        let resp = provider
            .chat(
                "system",
                &[Message::user("Hi")],
                &[],
                "claude-opus-4-5",
                &LlmRequestConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(resp.text(), "Hello!");
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(resp.usage.unwrap().input_tokens, 10);
    }

    #[tokio::test]
    async fn test_chat_sends_correct_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-opus-4-5",
                "max_tokens": 1024,
                "system": "You are terse.",
                "messages": [{"role": "user", "content": "test"}],
                "tools": [{"name": "bash"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("ok")))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(&make_config(&mock_server.uri(), "K_BODY"), "m");
        let tools = vec![ToolDefinition::new(
            "bash",
            "Execute a shell command",
            serde_json::json!({"type": "object", "properties": {}, "required": []}),
        )];
        let resp = provider
            .chat(
                "You are terse.",
                &[Message::user("test")],
                &tools,
                "claude-opus-4-5",
                &LlmRequestConfig { max_tokens: 1024 },
            )
            .await
            .unwrap();

        // If the body matcher fails, wiremock returns 404 → we'd get an error
        assert_eq!(resp.text(), "ok");
    }

    #[tokio::test]
    async fn test_chat_with_tool_use() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_tools",
                "content": [
                    {"type": "text", "text": "Checking."},
                    {"type": "tool_use", "id": "toolu_abc", "name": "read", "input": {"path": "a.rs"}}
                ],
                "stop_reason": "tool_use"
            })))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(&make_config(&mock_server.uri(), "K_TOOLS"), "m");
        let resp = provider
            .chat("s", &[Message::user("read a.rs")], &[], "m", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert!(resp.has_tool_calls());
        assert_eq!(
            resp.content[1],
            ContentBlock::tool_use("toolu_abc", "read", serde_json::json!({"path": "a.rs"}))
        );
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            })))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(&make_config(&mock_server.uri(), "K_UNSET_401"), "m");
        let err = provider
            .chat("s", &[Message::user("Hello")], &[], "m", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid x-api-key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"choices\": []}"))
            .mount(&mock_server)
            .await;

        let provider = HttpProvider::new(&make_config(&mock_server.uri(), "K_BAD"), "m");
        let err = provider
            .chat("s", &[Message::user("Hello")], &[], "m", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Decode(_)));
        assert!(err.to_string().starts_with("malformed response"));
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        // Point to a port that's not listening
        let provider = HttpProvider::new(&make_config("http://127.0.0.1:1", "K_NET"), "m");
        let err = provider
            .chat("s", &[Message::user("Hello")], &[], "m", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Http(_)));
    }
}
