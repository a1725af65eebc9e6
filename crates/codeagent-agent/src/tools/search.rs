//! Search tools — glob (by name) and grep (by content).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use glob::MatchOptions;
use regex::Regex;
use serde_json::Value;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::base::{optional_string, require_string, ParamKind, ParamSpec, Tool};

/// Returned when a search finds nothing.
pub const NONE: &str = "none";

/// Maximum number of grep hits returned.
pub const MAX_GREP_HITS: usize = 50;

// ─────────────────────────────────────────────
// Glob
// ─────────────────────────────────────────────

/// Expand `pattern` under `base`, newest files first.
///
/// Directories (and anything whose mtime can't be read) sort as if last
/// modified at the epoch. The sort is stable, so ties keep glob order.
pub fn glob_by_mtime(pattern: &str, base: &str) -> anyhow::Result<Vec<PathBuf>> {
    let full = format!("{base}/{pattern}").replace("//", "/");
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let paths = glob::glob_with(&full, options)
        .map_err(|e| anyhow::anyhow!("invalid glob pattern '{full}': {e}"))?;

    let mut entries: Vec<(SystemTime, PathBuf)> = paths
        .filter_map(Result::ok)
        .map(|p| (modified_or_epoch(&p), p))
        .collect();
    entries.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(entries.into_iter().map(|(_, p)| p).collect())
}

fn modified_or_epoch(path: &Path) -> SystemTime {
    if !path.is_file() {
        return UNIX_EPOCH;
    }
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(UNIX_EPOCH)
}

/// Finds files by glob pattern.
pub struct GlobTool;

const GLOB_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("pat", ParamKind::String),
    ParamSpec::optional("path", ParamKind::String),
];

#[async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &'static str {
        "glob"
    }

    fn description(&self) -> &'static str {
        "Find files by glob pattern"
    }

    fn params(&self) -> &'static [ParamSpec] {
        GLOB_PARAMS
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let pattern = require_string(&params, "pat")?;
        let base = optional_string(&params, "path").unwrap_or_else(|| ".".to_string());

        let matches = glob_by_mtime(&pattern, &base)?;
        debug!(pattern = %pattern, base = %base, matches = matches.len(), "glob");

        if matches.is_empty() {
            return Ok(NONE.to_string());
        }
        Ok(matches
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

// ─────────────────────────────────────────────
// Grep
// ─────────────────────────────────────────────

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Scan every file under `base` for lines matching `regex`.
///
/// Hidden entries below `base` are not descended into. Files that can't be
/// opened are skipped; a file that stops decoding mid-way keeps the hits
/// found before the bad line. Stops at `max_hits`.
pub fn grep_dir(regex: &Regex, base: &Path, max_hits: usize) -> Vec<String> {
    let mut hits = Vec::new();

    let walker = WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(Result::ok);

    for entry in walker {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "grep: skipping unreadable file");
                continue;
            }
        };

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let Ok(line) = line else { break };
            if regex.is_match(&line) {
                hits.push(format!("{}:{}:{}", path.display(), idx + 1, line.trim_end()));
                if hits.len() >= max_hits {
                    return hits;
                }
            }
        }
    }

    hits
}

/// Searches file contents with a regular expression.
pub struct GrepTool;

const GREP_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("pat", ParamKind::String),
    ParamSpec::optional("path", ParamKind::String),
];

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn description(&self) -> &'static str {
        "Search files using a regex pattern"
    }

    fn params(&self) -> &'static [ParamSpec] {
        GREP_PARAMS
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let pattern = require_string(&params, "pat")?;
        let base = optional_string(&params, "path").unwrap_or_else(|| ".".to_string());

        let regex = Regex::new(&pattern)
            .map_err(|e| anyhow::anyhow!("invalid regex '{pattern}': {e}"))?;
        let hits = grep_dir(&regex, Path::new(&base), MAX_GREP_HITS);
        debug!(pattern = %pattern, base = %base, hits = hits.len(), "grep");

        if hits.is_empty() {
            Ok(NONE.to_string())
        } else {
            Ok(hits.join("\n"))
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
