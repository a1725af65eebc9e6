//! codeagent CLI — entry point.
//!
//! # Commands
//!
//! - `codeagent agent [-m MESSAGE]` — main chat (single-shot or REPL)
//! - `codeagent init` — write the default config file

mod helpers;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use codeagent_agent::AgentLoop;
use codeagent_core::config::{get_config_path, load_config, save_config, Config};
use codeagent_providers::{HttpProvider, LlmRequestConfig};

use crate::helpers::ConsoleObserver;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Terminal coding assistant that reads, edits and runs things for you.
#[derive(Parser)]
#[command(name = "codeagent", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (single-shot or interactive REPL)
    Agent {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Model identifier (overrides config)
        #[arg(long)]
        model: Option<String>,

        /// Maximum tokens per reply (overrides config)
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write the default configuration file
    Init,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Agent {
            message,
            model,
            max_tokens,
            logs,
        } => {
            init_logging(logs);
            let mut config = load_config(None);
            apply_cli_overrides(&mut config, model, max_tokens);
            run_agent(&config, message).await
        }
        Commands::Init => run_init(),
    }
}

// ─────────────────────────────────────────────
// Agent command
// ─────────────────────────────────────────────

async fn run_agent(config: &Config, message: Option<String>) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut agent_loop = build_agent_loop(config, cwd.clone());

    match message {
        Some(msg) => {
            info!("processing single message");
            agent_loop
                .process_direct(&msg, &mut ConsoleObserver)
                .await
                .context("agent processing failed")?;
            println!();
        }
        None => {
            helpers::print_banner(agent_loop.model(), &cwd);
            repl::run(agent_loop).await?;
        }
    }

    Ok(())
}

/// Fold command-line flags into the loaded configuration.
fn apply_cli_overrides(config: &mut Config, model: Option<String>, max_tokens: Option<u32>) {
    if let Some(model) = model {
        config.agents.defaults.model = model;
    }
    if let Some(max_tokens) = max_tokens {
        config.agents.defaults.max_tokens = max_tokens;
    }
}

/// Build an `AgentLoop` from the loaded configuration.
fn build_agent_loop(config: &Config, working_dir: PathBuf) -> AgentLoop {
    let defaults = &config.agents.defaults;
    let provider = HttpProvider::new(&config.provider, &defaults.model);

    AgentLoop::new(
        Arc::new(provider),
        working_dir,
        Some(defaults.model.clone()),
        defaults.max_rounds,
        Some(LlmRequestConfig {
            max_tokens: defaults.max_tokens,
        }),
        Some(config.tools.exec.timeout),
    )
}

// ─────────────────────────────────────────────
// Init command
// ─────────────────────────────────────────────

fn run_init() -> Result<()> {
    let config_path = get_config_path();
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        let path = save_config(&Config::default(), Some(&config_path))?;
        println!("  {} created config at {}", "✓".green(), path.display());
    }
    Ok(())
}

/// Initialize tracing/logging on stderr.
///
/// `RUST_LOG` takes precedence over the `--logs` switch.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "codeagent=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_replace_config_values() {
        let mut config = Config::default();
        apply_cli_overrides(&mut config, Some("claude-sonnet-4-5".into()), Some(1024));
        assert_eq!(config.agents.defaults.model, "claude-sonnet-4-5");
        assert_eq!(config.agents.defaults.max_tokens, 1024);
    }

    #[test]
    fn cli_overrides_absent_keep_config() {
        let mut config = Config::default();
        apply_cli_overrides(&mut config, None, None);
        assert_eq!(config.agents.defaults.model, "claude-opus-4-5");
        assert_eq!(config.agents.defaults.max_tokens, 8192);
    }

    #[test]
    fn build_agent_loop_uses_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.agents.defaults.model = "claude-haiku-4-5".into();
        let agent = build_agent_loop(&config, dir.path().to_path_buf());
        assert_eq!(agent.model(), "claude-haiku-4-5");
        assert_eq!(agent.tools().len(), 6);
        assert!(agent.transcript().is_empty());
    }

    #[test]
    fn cli_parses_agent_flags() {
        let cli = Cli::try_parse_from([
            "codeagent", "agent", "-m", "hello", "--model", "m", "--max-tokens", "10", "--logs",
        ])
        .unwrap();
        match cli.command {
            Commands::Agent {
                message,
                model,
                max_tokens,
                logs,
            } => {
                assert_eq!(message.as_deref(), Some("hello"));
                assert_eq!(model.as_deref(), Some("m"));
                assert_eq!(max_tokens, Some(10));
                assert!(logs);
            }
            Commands::Init => panic!("expected agent command"),
        }
    }
}
