//! Tool catalog, enabled tool groups, and auto-selection mode endpoints.

use crate::backend::error::SyncError;
use crate::backend::models::MessageResponse;
use crate::backend::transport::{decode, BackendClient};
use crate::catalog::{dedup_names, ToolCatalog};
use serde::Deserialize;
use serde_json::Value;

/// Current field name for the auto-selection flag.
const SELECTION_MODE_KEY: &str = "selection_mode";
/// Older backends report the flag under this name.
const LEGACY_SELECTION_MODE_KEY: &str = "tool_auto_select";

#[derive(Debug, Deserialize)]
struct EnabledToolsResponse {
    #[serde(default)]
    enabled_tools_set: Option<Vec<String>>,
}

impl BackendClient {
    /// GET /get_tools: group name → tool name → description.
    pub async fn fetch_tool_catalog(&self) -> Result<ToolCatalog, SyncError> {
        let value = self.get("/get_tools").await?;
        decode(value)
    }

    /// GET /get_enabled_tools_set. `None` when the backend has no record yet; callers then
    /// treat every group as enabled.
    pub async fn fetch_enabled_groups(&self) -> Result<Option<Vec<String>>, SyncError> {
        let value = self.get("/get_enabled_tools_set").await?;
        let res: EnabledToolsResponse = decode(value)?;
        Ok(res.enabled_tools_set)
    }

    /// POST /set_enabled_tools_set: replaces the whole enabled set.
    pub async fn save_enabled_groups(&self, names: &[String]) -> Result<String, SyncError> {
        let names = dedup_names(names);
        let value = self.post_json("/set_enabled_tools_set", &names).await?;
        Ok(decode::<MessageResponse>(value)?.into_message())
    }

    /// GET /get_auto_tools_selection_mode, normalized to one boolean.
    pub async fn get_auto_selection_mode(&self) -> Result<bool, SyncError> {
        let value = self.get("/get_auto_tools_selection_mode").await?;
        Ok(selection_mode(&value))
    }

    /// POST /set_auto_tools_selection_mode?enabled=true|false.
    pub async fn set_auto_selection_mode(&self, enabled: bool) -> Result<String, SyncError> {
        let flag = if enabled { "true" } else { "false" };
        let value = self
            .post_query("/set_auto_tools_selection_mode", &[("enabled", flag)])
            .await?;
        Ok(decode::<MessageResponse>(value)?.into_message())
    }
}

/// The first boolean among `selection_mode` and the legacy key; false when neither is one.
fn selection_mode(value: &Value) -> bool {
    if let Some(enabled) = value.get(SELECTION_MODE_KEY).and_then(Value::as_bool) {
        return enabled;
    }
    match value.get(LEGACY_SELECTION_MODE_KEY).and_then(Value::as_bool) {
        Some(enabled) => {
            log::warn!(
                "backend reported auto tool selection under legacy field '{}'; expected '{}'",
                LEGACY_SELECTION_MODE_KEY,
                SELECTION_MODE_KEY
            );
            enabled
        }
        None => false,
    }
}
