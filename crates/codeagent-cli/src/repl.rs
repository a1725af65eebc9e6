//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use codeagent_agent::AgentLoop;
use codeagent_core::utils::{get_history_path, truncate_string};

use crate::helpers::{self, ConsoleObserver};

/// Commands that end the session.
const EXIT_COMMANDS: &[&str] = &["/q", "exit", "quit", "/exit", "/quit"];

/// Commands that discard the transcript.
const CLEAR_COMMANDS: &[&str] = &["/c", "/clear"];

/// What one line of input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionCommand<'a> {
    Empty,
    Exit,
    Clear,
    Message(&'a str),
}

/// Classify one line of input. Surrounding whitespace is ignored.
pub fn parse_command(input: &str) -> SessionCommand<'_> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        SessionCommand::Empty
    } else if EXIT_COMMANDS.contains(&trimmed) {
        SessionCommand::Exit
    } else if CLEAR_COMMANDS.contains(&trimmed) {
        SessionCommand::Clear
    } else {
        SessionCommand::Message(trimmed)
    }
}

/// Run the interactive REPL loop until exit, Ctrl-C or Ctrl-D.
pub async fn run(mut agent: AgentLoop) -> Result<()> {
    let mut editor = create_editor()?;
    let prompt = format!("{} ", "❯".blue().bold());

    loop {
        println!("{}", helpers::separator());
        let input = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };
        println!("{}", helpers::separator());

        match parse_command(&input) {
            SessionCommand::Empty => continue,
            SessionCommand::Exit => break,
            SessionCommand::Clear => {
                agent.clear();
                println!("{}", "⏺ Conversation cleared".green());
            }
            SessionCommand::Message(text) => {
                let _ = editor.add_history_entry(text);
                debug!(input = %truncate_string(text, 80), "processing input");

                if let Err(e) = agent.process_direct(text, &mut ConsoleObserver).await {
                    helpers::print_error(&e);
                }
                println!();
            }
        }
    }

    save_history(&mut editor);
    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
