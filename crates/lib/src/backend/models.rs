//! Model registry, active model, and connectivity endpoints.

use crate::backend::error::SyncError;
use crate::backend::transport::{decode, BackendClient};
use crate::model_config::{validate_all, ModelConfig};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageResponse {
    pub(crate) fn into_message(self) -> String {
        self.message.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentModelResponse {
    #[serde(default)]
    current_model: Option<String>,
}

impl BackendClient {
    /// POST /get_model_config: get-or-seed.
    ///
    /// If the backend already has a registry it is returned and `candidates` are ignored;
    /// otherwise the backend persists `candidates` and echoes them back.
    pub async fn fetch_model_configs(
        &self,
        candidates: &[ModelConfig],
    ) -> Result<Vec<ModelConfig>, SyncError> {
        let value = self.post_json("/get_model_config", candidates).await?;
        decode(value)
    }

    /// Seed the backend registry with `candidates` unless one already exists; returns the
    /// authoritative registry either way.
    pub async fn ensure_seeded(
        &self,
        candidates: &[ModelConfig],
    ) -> Result<Vec<ModelConfig>, SyncError> {
        self.fetch_model_configs(candidates).await
    }

    /// Read the backend registry without offering seed data.
    pub async fn fetch_registry(&self) -> Result<Vec<ModelConfig>, SyncError> {
        self.fetch_model_configs(&[]).await
    }

    /// POST /set_model_config: overwrite the whole registry. Every entry must be complete;
    /// nothing is sent otherwise.
    pub async fn save_model_configs(&self, configs: &[ModelConfig]) -> Result<String, SyncError> {
        validate_all(configs)?;
        let value = self.post_json("/set_model_config", configs).await?;
        Ok(decode::<MessageResponse>(value)?.into_message())
    }

    /// POST /set_current_model?model_name=<name>. The backend decides whether the name exists.
    pub async fn set_current_model(&self, name: &str) -> Result<String, SyncError> {
        if name.trim().is_empty() {
            return Err(SyncError::InvalidInput("model name is required".to_string()));
        }
        let value = self
            .post_query("/set_current_model", &[("model_name", name)])
            .await?;
        Ok(decode::<MessageResponse>(value)?.into_message())
    }

    /// GET /get_current_model. `None` means nothing has been selected yet.
    pub async fn get_current_model(&self) -> Result<Option<String>, SyncError> {
        let value = self.get("/get_current_model").await?;
        let res: CurrentModelResponse = decode(value)?;
        Ok(res.current_model.filter(|n| !n.trim().is_empty()))
    }

    /// POST /check_model_connectivity: the backend makes a live call to the provider.
    ///
    /// A 200 response carrying `Error` is a provider-side rejection and comes back as
    /// [`SyncError::Rejected`], never as data.
    pub async fn check_connectivity(&self, config: &ModelConfig) -> Result<String, SyncError> {
        config.validate()?;
        let value = self.post_json("/check_model_connectivity", config).await?;
        connectivity_result(value)
    }
}

fn connectivity_result(value: Value) -> Result<String, SyncError> {
    if let Some(err) = value.get("Error") {
        return Err(SyncError::Rejected(message_text(err)));
    }
    match value.get("Success") {
        Some(ok) => Ok(message_text(ok)),
        None => Err(SyncError::Decode(format!(
            "connectivity response has neither Success nor Error: {}",
            value
        ))),
    }
}

fn message_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
