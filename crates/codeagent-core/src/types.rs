//! Core types for codeagent — the transcript and the Messages API wire format.
//!
//! The model speaks in typed content blocks: free text, tool invocation
//! requests, and (on the way back) tool results. These enums are serialized
//! verbatim into requests, so the serde attributes are the wire contract.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// Who authored a transcript turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    /// Create a user message with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create a user message carrying tool results.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::Blocks(results),
        }
    }

    /// Create an assistant message from the blocks of a model reply.
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Message {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Number of `tool_result` blocks in this message.
    pub fn tool_result_count(&self) -> usize {
        match &self.content {
            MessageContent::Text(_) => 0,
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolResult { .. }))
                .count(),
        }
    }
}

/// Turn payload — either plain text or an ordered list of blocks.
///
/// Text serializes as a bare string, blocks as an array of tagged objects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A single unit of a model reply or a tool outcome.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    #[serde(rename = "tool_result")]
    ToolResult { tool_use_id: String, content: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Transcript
// ─────────────────────────────────────────────

/// Ordered turn history of one session.
///
/// Append-only for the life of a session; `clear` is the user's reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

// ─────────────────────────────────────────────
// Tool Definitions (for requests)
// ─────────────────────────────────────────────

/// Definition of a tool, sent to the model so it knows what it may call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

// ─────────────────────────────────────────────
// Request / Response
// ─────────────────────────────────────────────

/// Request body for a Messages API call.
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: &'a [Message],
    pub tools: &'a [ToolDefinition],
}

/// Raw Messages API response. Used internally for deserialization.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

/// Token usage statistics reported by the API.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// A parsed model reply.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Reply blocks in the order the model produced them.
    pub content: Vec<ContentBlock>,
    /// Why the model stopped generating.
    pub stop_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// Build a response from a list of blocks (tests and mocks).
    pub fn from_blocks(content: Vec<ContentBlock>) -> Self {
        LlmResponse {
            content,
            ..Default::default()
        }
    }

    /// Whether the reply requests at least one tool invocation.
    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// All text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<MessagesResponse> for LlmResponse {
    fn from(resp: MessagesResponse) -> Self {
        LlmResponse {
            content: resp.content,
            stop_reason: resp.stop_reason,
            usage: resp.usage,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_text_message_serialization() {
        let msg = Message::user("Hello, world!");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "Hello, world!");
    }

    #[test]
    fn test_assistant_blocks_serialization() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::text("Let me look."),
            ContentBlock::tool_use("toolu_1", "read", json!({"path": "a.txt"})),
        ]);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "assistant");
        let content = json["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Let me look.");
        assert_eq!(content[1]["type"], "tool_use");
        assert_eq!(content[1]["id"], "toolu_1");
        assert_eq!(content[1]["input"]["path"], "a.txt");
    }

    #[test]
    fn test_tool_result_serialization() {
        let msg = Message::tool_results(vec![ContentBlock::tool_result("toolu_1", "ok")]);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "tool_result");
        assert_eq!(json["content"][0]["tool_use_id"], "toolu_1");
        assert_eq!(json["content"][0]["content"], "ok");
        assert_eq!(msg.tool_result_count(), 1);
    }

    #[test]
    fn test_response_parsing() {
        let api_json = json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Reading it."},
                {"type": "tool_use", "id": "toolu_9", "name": "bash", "input": {"cmd": "ls"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 7}
        });

        let resp: MessagesResponse = serde_json::from_value(api_json).unwrap();
        let llm: LlmResponse = resp.into();

        assert!(llm.has_tool_calls());
        assert_eq!(llm.content.len(), 2);
        assert_eq!(llm.text(), "Reading it.");
        assert_eq!(llm.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(llm.usage.unwrap().output_tokens, 7);
    }

    #[test]
    fn test_response_without_tool_calls() {
        let llm = LlmResponse::from_blocks(vec![
            ContentBlock::text("one"),
            ContentBlock::text("two"),
        ]);
        assert!(!llm.has_tool_calls());
        assert_eq!(llm.text(), "one\ntwo");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::user("hi")];
        let tools = vec![ToolDefinition::new(
            "bash",
            "Execute a shell command",
            json!({"type": "object", "properties": {"cmd": {"type": "string"}}, "required": ["cmd"]}),
        )];
        let request = MessagesRequest {
            model: "claude-opus-4-5",
            max_tokens: 8192,
            system: "be brief",
            messages: &messages,
            tools: &tools,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-opus-4-5");
        assert_eq!(json["max_tokens"], 8192);
        assert_eq!(json["system"], "be brief");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["tools"][0]["name"], "bash");
        assert_eq!(json["tools"][0]["input_schema"]["required"][0], "cmd");
    }

    #[test]
    fn test_transcript_push_and_clear() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("a"));
        transcript.push(Message::assistant_blocks(vec![ContentBlock::text("b")]));
        transcript.push(Message::user("c"));
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[2], Message::user("c"));

        transcript.clear();
        assert!(transcript.is_empty());
    }
}
