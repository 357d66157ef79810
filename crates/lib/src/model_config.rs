//! Model configurations and the local registry state.
//!
//! The registry is a plain value: every edit returns a new [`ModelRegistry`] instead of
//! mutating the one that was last fetched from the backend.

use crate::backend::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named bundle of provider endpoint, credential, and provider-side model id.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Unique key and human label (e.g. "DeepSeek").
    pub name: String,
    /// Provider-side model identifier (e.g. "deepseek-chat").
    pub id: String,
    /// API base endpoint.
    pub url: String,
    pub api_key: String,
}

impl ModelConfig {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Names of the fields that are empty (after trimming).
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("id", &self.id),
            ("url", &self.url),
            ("api_key", &self.api_key),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// All four fields must be non-empty before the config is persisted or probed.
    pub fn validate(&self) -> Result<(), SyncError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }
        let label = if self.name.trim().is_empty() {
            "model config".to_string()
        } else {
            format!("model config '{}'", self.name)
        };
        Err(SyncError::InvalidInput(format!(
            "{} is missing required fields: {}",
            label,
            missing.join(", ")
        )))
    }

    /// API key with all but the first few characters hidden.
    pub fn masked_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("url", &self.url)
            .field("api_key", &self.masked_key())
            .finish()
    }
}

/// Keys longer than the visible prefix show their first 3 characters; shorter ones are fully hidden.
fn mask_key(key: &str) -> String {
    const VISIBLE: usize = 3;
    match key.chars().count() {
        0 => String::new(),
        n if n <= VISIBLE => "***".to_string(),
        _ => format!("{}***", key.chars().take(VISIBLE).collect::<String>()),
    }
}

/// Validate a whole list; the first incomplete entry fails it.
pub fn validate_all(configs: &[ModelConfig]) -> Result<(), SyncError> {
    configs.iter().try_for_each(ModelConfig::validate)
}

/// Local copy of the model roster plus the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    models: Vec<ModelConfig>,
    current: Option<String>,
}

impl ModelRegistry {
    pub fn new(models: Vec<ModelConfig>) -> Self {
        Self {
            models,
            current: None,
        }
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    pub fn get(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Config of the current selection, if the name resolves in this registry.
    pub fn current_config(&self) -> Option<&ModelConfig> {
        self.current.as_deref().and_then(|n| self.get(n))
    }

    /// Merge an authoritative list (from the backend) into this one, matching on `name`.
    /// Local order is kept; entries only the backend knows are appended.
    pub fn spliced(&self, authoritative: &[ModelConfig]) -> Self {
        let mut models = self.models.clone();
        for remote in authoritative {
            match models.iter_mut().find(|m| m.name == remote.name) {
                Some(local) => {
                    local.id = remote.id.clone();
                    local.url = remote.url.clone();
                    local.api_key = remote.api_key.clone();
                }
                None => models.push(remote.clone()),
            }
        }
        Self {
            models,
            current: self.current.clone(),
        }
    }

    /// Replace the entry with the same name, or append it.
    pub fn with_updated(&self, config: ModelConfig) -> Self {
        let mut models = self.models.clone();
        match models.iter_mut().find(|m| m.name == config.name) {
            Some(slot) => *slot = config,
            None => models.push(config),
        }
        Self {
            models,
            current: self.current.clone(),
        }
    }

    pub fn without(&self, name: &str) -> Self {
        let models = self
            .models
            .iter()
            .filter(|m| m.name != name)
            .cloned()
            .collect();
        let current = self.current.clone().filter(|c| c != name);
        Self { models, current }
    }

    pub fn with_current(&self, name: Option<String>) -> Self {
        Self {
            models: self.models.clone(),
            current: name.filter(|n| !n.trim().is_empty()),
        }
    }
}
