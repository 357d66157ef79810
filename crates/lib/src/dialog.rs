//! Configuration dialog sessions.
//!
//! A session fetches fresh backend state when it opens, keeps edits local, and pushes the
//! final state back in whole-document writes. Nothing is cached across sessions.

use crate::backend::{BackendClient, SyncError};
use crate::catalog::{enabled_or_default, EnabledToolGroups, ToolCatalog};
use crate::model_config::{ModelConfig, ModelRegistry};
use tokio_util::sync::CancellationToken;

/// Tool configuration as loaded into (and edited by) an open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSelection {
    pub catalog: ToolCatalog,
    pub enabled: EnabledToolGroups,
    pub auto_select: bool,
}

impl ToolSelection {
    pub fn is_enabled(&self, group: &str) -> bool {
        self.enabled.contains(group)
    }
}

#[derive(Debug)]
pub enum ToolDialogState {
    Closed,
    Loading,
    Loaded(ToolSelection),
    Errored(SyncError),
}

/// Tool group dialog: `Closed -> Loading -> Loaded | Errored -> confirm -> Closed`.
pub struct ToolDialog {
    client: BackendClient,
    state: ToolDialogState,
    cancel: CancellationToken,
}

impl ToolDialog {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            state: ToolDialogState::Closed,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &ToolDialogState {
        &self.state
    }

    pub fn selection(&self) -> Option<&ToolSelection> {
        match &self.state {
            ToolDialogState::Loaded(sel) => Some(sel),
            _ => None,
        }
    }

    /// Token of the current session. Cancelling it aborts whatever request the dialog has in flight.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn session_client(&mut self) -> BackendClient {
        session_client(&self.client, &mut self.cancel)
    }

    /// Fetch catalog, enabled set, and mode. Always re-fetches, whatever the previous state.
    pub async fn open(&mut self) -> &ToolDialogState {
        let client = self.session_client();
        self.state = ToolDialogState::Loading;
        self.state = match load_selection(&client).await {
            Ok(sel) => ToolDialogState::Loaded(sel),
            Err(SyncError::Cancelled) => {
                log::debug!("tool dialog closed while loading");
                ToolDialogState::Closed
            }
            Err(e) => ToolDialogState::Errored(e),
        };
        &self.state
    }

    /// [`ToolDialog::open`] as a `Result`. On failure the error is handed back and the dialog is closed.
    pub async fn try_open(&mut self) -> Result<ToolSelection, SyncError> {
        self.open().await;
        match std::mem::replace(&mut self.state, ToolDialogState::Closed) {
            ToolDialogState::Loaded(sel) => {
                self.state = ToolDialogState::Loaded(sel.clone());
                Ok(sel)
            }
            ToolDialogState::Errored(e) => Err(e),
            ToolDialogState::Closed | ToolDialogState::Loading => Err(SyncError::Cancelled),
        }
    }

    fn loaded_mut(&mut self) -> Result<&mut ToolSelection, SyncError> {
        match &mut self.state {
            ToolDialogState::Loaded(sel) => Ok(sel),
            _ => Err(SyncError::InvalidInput(
                "tool dialog has no loaded configuration".to_string(),
            )),
        }
    }

    /// Local edit; nothing is sent until [`ToolDialog::confirm`].
    pub fn toggle_group(&mut self, group: &str, enabled: bool) -> Result<(), SyncError> {
        let sel = self.loaded_mut()?;
        if !sel.catalog.contains_key(group) {
            return Err(SyncError::InvalidInput(format!("unknown tool group: {}", group)));
        }
        if enabled {
            sel.enabled.insert(group.to_string());
        } else {
            sel.enabled.remove(group);
        }
        Ok(())
    }

    pub fn set_auto_select(&mut self, auto_select: bool) -> Result<(), SyncError> {
        self.loaded_mut()?.auto_select = auto_select;
        Ok(())
    }

    /// Push the final enabled set (one whole-set write) and the mode, then close.
    /// On failure the dialog stays loaded with its edits so the user can retry.
    pub async fn confirm(&mut self) -> Result<String, SyncError> {
        let ToolDialogState::Loaded(sel) = &self.state else {
            return Err(SyncError::InvalidInput(
                "tool dialog has no loaded configuration".to_string(),
            ));
        };
        let names: Vec<String> = sel.enabled.iter().cloned().collect();
        let auto_select = sel.auto_select;
        let client = self.session_client();
        let message = client.save_enabled_groups(&names).await?;
        client.set_auto_selection_mode(auto_select).await?;
        self.state = ToolDialogState::Closed;
        Ok(message)
    }

    /// Abort anything in flight and close. The next `open` starts a fresh session.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.state = ToolDialogState::Closed;
    }
}

/// Client bound to the session token, re-armed first if a previous call was cancelled.
fn session_client(client: &BackendClient, cancel: &mut CancellationToken) -> BackendClient {
    if cancel.is_cancelled() {
        *cancel = CancellationToken::new();
    }
    client.with_cancellation(cancel.clone())
}

async fn load_selection(client: &BackendClient) -> Result<ToolSelection, SyncError> {
    let (catalog, stored, auto_select) = tokio::try_join!(
        client.fetch_tool_catalog(),
        client.fetch_enabled_groups(),
        client.get_auto_selection_mode(),
    )?;
    let enabled = enabled_or_default(&catalog, stored);
    Ok(ToolSelection {
        catalog,
        enabled,
        auto_select,
    })
}

/// Model dialog: owns the local registry and syncs it with the backend.
pub struct ModelDialog {
    client: BackendClient,
    registry: ModelRegistry,
    cancel: CancellationToken,
}

impl ModelDialog {
    /// `seed` is the local roster offered to an empty backend (usually the presets).
    pub fn new(client: BackendClient, seed: ModelRegistry) -> Self {
        Self {
            client,
            registry: seed,
            cancel: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn session_client(&mut self) -> BackendClient {
        session_client(&self.client, &mut self.cancel)
    }

    /// Get-or-seed the backend registry with the local roster, splice the authoritative list
    /// back in by name, and pick up the current selection.
    pub async fn load(&mut self) -> Result<&ModelRegistry, SyncError> {
        let client = self.session_client();
        let remote = client.fetch_model_configs(self.registry.models()).await?;
        let mut registry = self.registry.spliced(&remote);
        match client.get_current_model().await {
            Ok(current) => registry = registry.with_current(current),
            Err(SyncError::Cancelled) => return Err(SyncError::Cancelled),
            Err(e) => log::warn!("could not read current model: {}", e),
        }
        self.registry = registry;
        Ok(&self.registry)
    }

    pub fn edit(&mut self, config: ModelConfig) {
        self.registry = self.registry.with_updated(config);
    }

    /// Returns false when no entry has that name.
    pub fn remove(&mut self, name: &str) -> bool {
        if self.registry.get(name).is_none() {
            return false;
        }
        self.registry = self.registry.without(name);
        true
    }

    /// Overwrite the backend registry with every complete local entry.
    /// Entries still missing a field (e.g. presets without a key) stay local.
    pub async fn save(&mut self) -> Result<String, SyncError> {
        let complete: Vec<ModelConfig> = self
            .registry
            .models()
            .iter()
            .filter(|m| m.is_complete())
            .cloned()
            .collect();
        let skipped = self.registry.models().len() - complete.len();
        if skipped > 0 {
            log::debug!("not saving {} incomplete model config(s)", skipped);
        }
        self.session_client().save_model_configs(&complete).await
    }

    /// Make `name` the backend's current model; the local selection follows on success.
    pub async fn select(&mut self, name: &str) -> Result<String, SyncError> {
        let message = self.session_client().set_current_model(name).await?;
        self.registry = self.registry.with_current(Some(name.to_string()));
        Ok(message)
    }

    /// Connectivity probe of a local entry (including unsaved edits).
    pub async fn probe(&mut self, name: &str) -> Result<String, SyncError> {
        let client = self.session_client();
        let config = self
            .registry
            .get(name)
            .ok_or_else(|| SyncError::InvalidInput(format!("unknown model: {}", name)))?;
        client.check_connectivity(config).await
    }

    pub fn close(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
    }
}
