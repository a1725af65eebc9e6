//! Tool trait — the interface every built-in tool implements.
//!
//! Tools declare their parameters as a static table of [`ParamSpec`]s. The
//! JSON schema sent to the model and the argument check run before every
//! call are both derived from that one table, so they cannot disagree.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use codeagent_core::types::ToolDefinition;

// ─────────────────────────────────────────────
// Parameter declarations
// ─────────────────────────────────────────────

/// Abstract parameter kind as declared by a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

impl ParamKind {
    /// JSON schema type published to the model. Numbers are integers.
    pub fn wire_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "integer",
            ParamKind::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Number => value.is_i64() || value.is_u64(),
            ParamKind::Boolean => value.is_boolean(),
        }
    }
}

/// One declared parameter.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, required: false }
    }
}

/// Build the `input_schema` object for a parameter table.
pub fn build_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for p in params {
        properties.insert(p.name.to_string(), json!({ "type": p.kind.wire_type() }));
        if p.required {
            required.push(Value::String(p.name.to_string()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Check `params` against the declared table.
///
/// Required parameters must be present, and every declared parameter that is
/// present must have the declared kind. Undeclared keys are ignored.
pub fn validate_params(params: &HashMap<String, Value>, specs: &[ParamSpec]) -> anyhow::Result<()> {
    for spec in specs {
        match params.get(spec.name) {
            None | Some(Value::Null) if spec.required => {
                anyhow::bail!("missing required parameter: {}", spec.name)
            }
            Some(value) if !value.is_null() && !spec.kind.accepts(value) => {
                anyhow::bail!(
                    "parameter '{}' must be of type {}",
                    spec.name,
                    spec.kind.wire_type()
                )
            }
            _ => {}
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The registry sends `to_definition()` to the model, validates arguments
/// against `params()`, and dispatches to `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the model to call this tool (e.g. `"read"`).
    fn name(&self) -> &'static str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &'static str;

    /// Declared parameters, in publication order.
    fn params(&self) -> &'static [ParamSpec];

    /// Execute the tool with already-validated arguments.
    ///
    /// On failure, return an `Err` — the registry turns it into
    /// `"error: <message>"` for the model.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String>;

    /// Build the `ToolDefinition` sent to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), build_schema(self.params()))
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("missing required parameter: {key}"))
}

/// Extract an optional `String` param.
pub fn optional_string(params: &HashMap<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Extract an optional non-negative integer param.
///
/// Absent → `Ok(None)`; negative → error.
pub fn optional_usize(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<Option<usize>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) => Ok(Some(n as usize)),
            None => anyhow::bail!("parameter '{key}' must be a non-negative integer"),
        },
    }
}

/// Extract an optional boolean param (defaults to `false` if absent).
pub fn optional_bool(params: &HashMap<String, Value>, key: &str) -> bool {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}
