//! Tool Registry — the fixed set of tools the model can call.
//!
//! Built once at startup and never mutated afterwards. Dispatch is the
//! error boundary of the tool layer: whatever happens inside a tool, the
//! caller gets a `String` back.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use codeagent_core::types::ToolDefinition;

use super::base::{validate_params, Tool};
use super::filesystem::{EditTool, ReadTool, WriteTool};
use super::search::{GlobTool, GrepTool};
use super::shell::BashTool;

/// Prefix of every failed tool result.
pub const ERROR_PREFIX: &str = "error: ";

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
pub struct ToolRegistry {
    tools: HashMap<&'static str, Box<dyn Tool>>,
    /// Registration order, which is also publication order.
    order: Vec<&'static str>,
}

impl ToolRegistry {
    fn empty() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The built-in tool set: read, write, edit, glob, grep, bash.
    ///
    /// `working_dir` is where shell commands run; `bash_timeout_secs`
    /// defaults to 30.
    pub fn builtin(working_dir: PathBuf, bash_timeout_secs: Option<u64>) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ReadTool));
        registry.register(Box::new(WriteTool));
        registry.register(Box::new(EditTool));
        registry.register(Box::new(GlobTool));
        registry.register(Box::new(GrepTool));
        registry.register(Box::new(BashTool::new(working_dir, bash_timeout_secs)));
        registry
    }

    fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name();
        debug!(tool = name, "registered tool");
        if self.tools.insert(name, tool).is_none() {
            self.order.push(name);
        }
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    /// The schema list sent with every model request.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.to_definition())
            .collect()
    }

    /// Execute a tool by name with the model-supplied `input`.
    ///
    /// Unknown tools, non-object arguments, schema violations and executor
    /// failures all come back as `"error: <message>"`.
    pub async fn execute(&self, name: &str, input: &Value) -> String {
        match self.try_execute(name, input).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }

    async fn try_execute(&self, name: &str, input: &Value) -> anyhow::Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("unknown tool '{name}'"))?;

        let params: HashMap<String, Value> = match input {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => anyhow::bail!("arguments for '{name}' must be a JSON object"),
        };
        validate_params(&params, tool.params())?;

        tool.execute(params).await
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::{ParamKind, ParamSpec};
    use async_trait::async_trait;
    use serde_json::json;

    /// Minimal test tool.
    struct EchoTool;

    const ECHO_PARAMS: &[ParamSpec] = &[ParamSpec::required("text", ParamKind::String)];

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn description(&self) -> &'static str {
            "Echoes back the input"
        }
        fn params(&self) -> &'static [ParamSpec] {
            ECHO_PARAMS
        }
        async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
            let text = params.get("text").and_then(|v| v.as_str()).unwrap_or_default();
            Ok(format!("Echo: {text}"))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &'static str {
            "fail"
        }
        fn description(&self) -> &'static str {
            "Always fails"
        }
        fn params(&self) -> &'static [ParamSpec] {
            &[]
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
            anyhow::bail!("intentional failure")
        }
    }

    fn test_registry() -> ToolRegistry {
        let mut reg = ToolRegistry::empty();
        reg.register(Box::new(EchoTool));
        reg.register(Box::new(FailTool));
        reg
    }

    #[test]
    fn test_builtin_tools() {
        let reg = ToolRegistry::builtin(PathBuf::from("."), None);
        assert_eq!(reg.tool_names(), vec!["read", "write", "edit", "glob", "grep", "bash"]);
        assert_eq!(reg.len(), 6);
        assert!(reg.has("grep"));
        assert!(!reg.has("exec"));
    }

    #[test]
    fn test_get_definitions_in_order() {
        let reg = ToolRegistry::builtin(PathBuf::from("."), None);
        let defs = reg.get_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["read", "write", "edit", "glob", "grep", "bash"]);
        for def in &defs {
            assert_eq!(def.input_schema["type"], "object");
            assert!(!def.description.is_empty());
        }
    }

    #[test]
    fn test_register_same_name_twice_keeps_one_entry() {
        let mut reg = test_registry();
        reg.register(Box::new(EchoTool));
        assert_eq!(reg.tool_names(), vec!["echo", "fail"]);
        assert_eq!(reg.len(), 2);
    }

    #[tokio::test]
    async fn test_execute_success() {
        let reg = test_registry();
        let result = reg.execute("echo", &json!({"text": "hello"})).await;
        assert_eq!(result, "Echo: hello");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let reg = test_registry();
        let result = reg.execute("missing", &json!({})).await;
        assert_eq!(result, "error: unknown tool 'missing'");
    }

    #[tokio::test]
    async fn test_execute_missing_required_param() {
        let reg = test_registry();
        let result = reg.execute("echo", &json!({})).await;
        assert_eq!(result, "error: missing required parameter: text");
    }

    #[tokio::test]
    async fn test_execute_non_object_arguments() {
        let reg = test_registry();
        let result = reg.execute("echo", &json!("hello")).await;
        assert!(result.starts_with("error: arguments for 'echo' must be a JSON object"));
    }

    #[tokio::test]
    async fn test_execute_error_caught() {
        let reg = test_registry();
        let result = reg.execute("fail", &json!({})).await;
        assert_eq!(result, "error: intentional failure");
    }

    #[tokio::test]
    async fn test_builtin_error_is_text() {
        let dir = tempfile::tempdir().unwrap();
        let reg = ToolRegistry::builtin(dir.path().to_path_buf(), None);
        let missing = dir.path().join("missing.txt");
        let result = reg
            .execute("read", &json!({"path": missing.to_str().unwrap()}))
            .await;
        assert!(result.starts_with(ERROR_PREFIX));
    }
}
