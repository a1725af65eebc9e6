//! Filesystem tools — read, write, edit.
//!
//! Paths are used as given: relative paths resolve against the process
//! working directory, the same directory `bash` commands run in.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::base::{
    optional_bool, optional_usize, require_string, ParamKind, ParamSpec, Tool,
};

/// Token returned by tools whose only output is success.
pub const OK: &str = "ok";

// ─────────────────────────────────────────────
// Pure helpers
// ─────────────────────────────────────────────

/// Number the lines of `content` from `offset` (0-based) on, at most `limit`.
///
/// Each line becomes `"{n:>4}| {line}"` where `n` is its 1-based position in
/// the file. Line terminators are kept, so the output is itself line-oriented.
pub fn number_lines(content: &str, offset: usize, limit: Option<usize>) -> String {
    content
        .split_inclusive('\n')
        .enumerate()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .map(|(i, line)| format!("{:>4}| {}", i + 1, line))
        .collect()
}

/// Replace `old` with `new` in `text`.
///
/// Fails if `old` is absent, or if it occurs more than once and `all` is not
/// set. With `all` every occurrence is replaced; otherwise exactly one.
pub fn replace_text(text: &str, old: &str, new: &str, all: bool) -> anyhow::Result<String> {
    if old.is_empty() {
        anyhow::bail!("old_string must not be empty");
    }

    let count = text.matches(old).count();
    if count == 0 {
        anyhow::bail!("old_string not found");
    }
    if count > 1 && !all {
        anyhow::bail!(
            "old_string appears {count} times; must be unique (set all=true to replace all)"
        );
    }

    Ok(if all {
        text.replace(old, new)
    } else {
        text.replacen(old, new, 1)
    })
}

// ─────────────────────────────────────────────
// ReadTool
// ─────────────────────────────────────────────

/// Reads a file (or a window of it) with line numbers.
pub struct ReadTool;

const READ_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("path", ParamKind::String),
    ParamSpec::optional("offset", ParamKind::Number),
    ParamSpec::optional("limit", ParamKind::Number),
];

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &'static str {
        "read"
    }

    fn description(&self) -> &'static str {
        "Read a file with line numbers"
    }

    fn params(&self) -> &'static [ParamSpec] {
        READ_PARAMS
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path = require_string(&params, "path")?;
        let offset = optional_usize(&params, "offset")?.unwrap_or(0);
        let limit = optional_usize(&params, "limit")?;

        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {path}: {e}"))?;
        Ok(number_lines(&content, offset, limit))
    }
}

// ─────────────────────────────────────────────
// WriteTool
// ─────────────────────────────────────────────

/// Creates or overwrites a file with the given content.
pub struct WriteTool;

const WRITE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("path", ParamKind::String),
    ParamSpec::required("content", ParamKind::String),
];

#[async_trait]
impl Tool for WriteTool {
    fn name(&self) -> &'static str {
        "write"
    }

    fn description(&self) -> &'static str {
        "Write content to a file (overwrite)"
    }

    fn params(&self) -> &'static [ParamSpec] {
        WRITE_PARAMS
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path = require_string(&params, "path")?;
        let content = require_string(&params, "content")?;

        std::fs::write(&path, content)
            .map_err(|e| anyhow::anyhow!("failed to write {path}: {e}"))?;
        Ok(OK.to_string())
    }
}

// ─────────────────────────────────────────────
// EditTool
// ─────────────────────────────────────────────

/// Replaces text in a file; ambiguous matches are refused unless `all` is set.
pub struct EditTool;

const EDIT_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("path", ParamKind::String),
    ParamSpec::required("old", ParamKind::String),
    ParamSpec::required("new", ParamKind::String),
    ParamSpec::optional("all", ParamKind::Boolean),
];

#[async_trait]
impl Tool for EditTool {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn description(&self) -> &'static str {
        "Replace text in a file (requires unique match unless all=true)"
    }

    fn params(&self) -> &'static [ParamSpec] {
        EDIT_PARAMS
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let path = require_string(&params, "path")?;
        let old = require_string(&params, "old")?;
        let new = require_string(&params, "new")?;
        let all = optional_bool(&params, "all");

        let text = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read {path}: {e}"))?;

        // Nothing is written unless the replacement is unambiguous.
        let updated = replace_text(&text, &old, &new, all)?;
        std::fs::write(&path, updated)
            .map_err(|e| anyhow::anyhow!("failed to write {path}: {e}"))?;
        Ok(OK.to_string())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
