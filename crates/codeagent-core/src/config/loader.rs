//! Config loader — reads `~/.codeagent/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.codeagent/config.json`
//! 3. Environment variables `CODEAGENT_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    debug!("Config saved to {}", config_path.display());
    Ok(config_path)
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `CODEAGENT_AGENTS__DEFAULTS__MODEL`
/// - `CODEAGENT_AGENTS__DEFAULTS__MAX_TOKENS`
/// - `CODEAGENT_AGENTS__DEFAULTS__MAX_ROUNDS`
/// - `CODEAGENT_PROVIDER__API_BASE`
/// - `CODEAGENT_PROVIDER__API_KEY_ENV`
/// - `CODEAGENT_TOOLS__EXEC__TIMEOUT`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Override logic with an injectable lookup so tests need not touch the
/// process environment.
fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(val) = var("CODEAGENT_AGENTS__DEFAULTS__MODEL") {
        config.agents.defaults.model = val;
    }
    if let Some(val) = var("CODEAGENT_AGENTS__DEFAULTS__MAX_TOKENS") {
        match val.parse::<u32>() {
            Ok(n) => config.agents.defaults.max_tokens = n,
            Err(_) => warn!(value = %val, "ignoring invalid CODEAGENT_AGENTS__DEFAULTS__MAX_TOKENS"),
        }
    }
    if let Some(val) = var("CODEAGENT_AGENTS__DEFAULTS__MAX_ROUNDS") {
        match val.parse::<u32>() {
            Ok(n) => config.agents.defaults.max_rounds = Some(n),
            Err(_) => warn!(value = %val, "ignoring invalid CODEAGENT_AGENTS__DEFAULTS__MAX_ROUNDS"),
        }
    }

    if let Some(val) = var("CODEAGENT_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Some(val) = var("CODEAGENT_PROVIDER__API_KEY_ENV") {
        config.provider.api_key_env = val;
    }

    if let Some(val) = var("CODEAGENT_TOOLS__EXEC__TIMEOUT") {
        match val.parse::<u64>() {
            Ok(n) => config.tools.exec.timeout = n,
            Err(_) => warn!(value = %val, "ignoring invalid CODEAGENT_TOOLS__EXEC__TIMEOUT"),
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
