//! Initialize the configuration directory: create ~/.agentcfg and a default config.json.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{BackendConfig, Config, DEFAULT_BACKEND_URL};

/// Create the config directory and default config file if they do not exist.
/// An existing config file is left untouched. Returns the config directory.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        let default_config = Config {
            backend: BackendConfig {
                base_url: Some(DEFAULT_BACKEND_URL.to_string()),
                timeout_secs: None,
            },
        };
        let json = serde_json::to_string_pretty(&default_config)
            .context("serializing default config")?;
        std::fs::write(config_path, json)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}
