//! agentcfg core library: keeps the agent backend's model roster, current model, enabled
//! tool groups, and tool selection mode in sync with local edits.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod dialog;
pub mod init;
pub mod model_config;
pub mod presets;
