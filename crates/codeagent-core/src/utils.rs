//! Utility helpers — data directory paths and string trimming.

use std::path::PathBuf;

/// Get the codeagent data directory (e.g. `~/.codeagent/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".codeagent")
}

/// Get the REPL history file (e.g. `~/.codeagent/history/cli_history`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history").join("cli_history")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// First line of `s`, cut to at most `max_len` characters (no ellipsis).
pub fn first_line(s: &str, max_len: usize) -> String {
    s.lines().next().unwrap_or("").chars().take(max_len).collect()
}
