//! Shell tool — run a command through `sh -c` with a hard timeout.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{info, warn};

use super::base::{require_string, ParamKind, ParamSpec, Tool};

/// Default command timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Returned when a command prints nothing.
pub const EMPTY_OUTPUT: &str = "(empty)";

// ─────────────────────────────────────────────
// BashTool
// ─────────────────────────────────────────────

/// Execute shell commands in a subprocess.
pub struct BashTool {
    /// Working directory for commands.
    working_dir: PathBuf,
    /// Wall-clock limit per command.
    timeout: Duration,
}

const BASH_PARAMS: &[ParamSpec] = &[ParamSpec::required("cmd", ParamKind::String)];

impl BashTool {
    pub fn new(working_dir: PathBuf, timeout_secs: Option<u64>) -> Self {
        Self {
            working_dir,
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// Join stdout and stderr (in that order), trimmed; `(empty)` if blank.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(stderr));
    let trimmed = combined.trim();
    if trimmed.is_empty() {
        EMPTY_OUTPUT.to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &'static str {
        "bash"
    }

    fn description(&self) -> &'static str {
        "Execute a shell command"
    }

    fn params(&self) -> &'static [ParamSpec] {
        BASH_PARAMS
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let command = require_string(&params, "cmd")?;

        info!(command = %command, cwd = %self.working_dir.display(), "executing shell command");

        let child = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("failed to spawn command: {e}"))?;

        // On timeout the future (and with it the child) is dropped, which kills it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(combine_output(&output.stdout, &output.stderr)),
            Ok(Err(e)) => anyhow::bail!("command failed: {e}"),
            Err(_) => {
                warn!(command = %command, "shell command timed out");
                anyhow::bail!("command timed out after {}s", self.timeout.as_secs())
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
