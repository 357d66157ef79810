//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.agentcfg/config.json`) and environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend used when neither an override, env, nor config file names one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:1013";

/// Env var that overrides `backend.baseUrl`.
pub const BACKEND_URL_ENV: &str = "AGENTCFG_BACKEND_URL";

/// Env var that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "AGENTCFG_CONFIG_PATH";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Configuration backend settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Where the configuration backend lives and how long to wait for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Base URL (default http://localhost:1013). Overridden by AGENTCFG_BACKEND_URL env.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Whole-request timeout in seconds. Unset or 0 leaves the HTTP client's default (no timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.trim_end_matches('/').to_string())
    }
}

/// Resolve the backend base URL: explicit override, then AGENTCFG_BACKEND_URL, then config, then default.
pub fn resolve_backend_url(config: &Config, override_url: Option<&str>) -> String {
    let env = std::env::var(BACKEND_URL_ENV).ok();
    resolve_backend_url_from(config, override_url, env.as_deref())
}

fn resolve_backend_url_from(
    config: &Config,
    override_url: Option<&str>,
    env_url: Option<&str>,
) -> String {
    override_url
        .and_then(non_empty)
        .or_else(|| env_url.and_then(non_empty))
        .or_else(|| config.backend.base_url.as_deref().and_then(non_empty))
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".agentcfg").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, or the default path (or AGENTCFG_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
