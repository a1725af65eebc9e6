//! Shared CLI helpers — banner, markdown rendering, and exchange output.

use std::path::Path;
use std::sync::OnceLock;

use colored::Colorize;
use regex::{Captures, Regex};
use serde_json::Value;

use codeagent_agent::AgentLoopObserver;
use codeagent_core::utils::first_line;

/// Maximum characters of a tool result shown in the preview line.
const PREVIEW_CHARS: usize = 80;

/// Widest the rule printed around the prompt gets.
const MAX_SEPARATOR_WIDTH: usize = 80;

/// Arguments shown next to a tool name, by preference. Each tool's first
/// declared parameter comes before `path`.
const PRIMARY_ARGS: &[&str] = &["pat", "cmd", "path"];

/// Print the banner shown at startup: name, model, working directory.
pub fn print_banner(model: &str, cwd: &Path) {
    println!(
        "{} | {}\n",
        "Code Agent".bold(),
        format!("{model} | {}", cwd.display()).dimmed()
    );
}

/// Horizontal rule drawn above and below the prompt.
pub fn separator() -> String {
    let columns = crossterm::terminal::size().ok().map(|(cols, _)| cols);
    "─".repeat(separator_width(columns)).dimmed().to_string()
}

/// `min(columns, 80)`, or 80 when the width is unknown (not a tty).
fn separator_width(columns: Option<u16>) -> usize {
    match columns {
        Some(cols) if cols > 0 => usize::from(cols).min(MAX_SEPARATOR_WIDTH),
        _ => MAX_SEPARATOR_WIDTH,
    }
}

/// Print a session error as a single red line.
pub fn print_error(error: &anyhow::Error) {
    println!("{}", format!("⏺ Error: {error:#}").red());
}

/// Render `**bold**` spans as terminal bold.
pub fn render_markdown(text: &str) -> String {
    static BOLD: OnceLock<Option<Regex>> = OnceLock::new();
    match BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").ok()) {
        Some(re) => re
            .replace_all(text, |caps: &Captures| caps[1].bold().to_string())
            .into_owned(),
        None => text.to_string(),
    }
}

/// The argument shown in a tool activity line.
///
/// Prefers the well-known primary argument, then falls back to the first
/// value present. Strings are shown without quotes.
pub fn primary_argument(input: &Value) -> String {
    let Some(map) = input.as_object() else {
        return input.to_string();
    };
    let value = PRIMARY_ARGS
        .iter()
        .find_map(|key| map.get(*key))
        .or_else(|| map.values().next());
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

// ─────────────────────────────────────────────
// Console observer
// ─────────────────────────────────────────────

/// Prints an exchange as it happens: reply text, tool calls, result previews.
pub struct ConsoleObserver;

impl AgentLoopObserver for ConsoleObserver {
    fn on_text(&mut self, text: &str) {
        println!("\n{} {}", "⏺".cyan(), render_markdown(text));
    }

    fn on_tool_call(&mut self, name: &str, input: &Value) {
        println!(
            "\n{}({})",
            format!("⏺ {name}").green(),
            primary_argument(input).dimmed()
        );
    }

    fn on_tool_result(&mut self, _name: &str, result: &str) {
        let preview = first_line(result, PREVIEW_CHARS);
        println!("  {}", format!("⎿ {preview}").dimmed());
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
