use agentcfg::backend::{ApiResponse, BackendClient, SyncError};
use agentcfg::catalog::group_label;
use agentcfg::dialog::{ModelDialog, ToolDialog, ToolSelection};
use agentcfg::model_config::{ModelConfig, ModelRegistry};
use agentcfg::presets;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentcfg")]
#[command(about = "Manage models and tool groups on the agent backend", long_about = None)]
struct Cli {
    /// Backend base URL (overrides AGENTCFG_BACKEND_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    backend: Option<String>,

    /// Config file path (default: AGENTCFG_CONFIG_PATH or ~/.agentcfg/config.json)
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print results as a {data, error, details} JSON envelope
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config.json.
    Init,

    /// Model roster, current model, and connectivity checks.
    Models {
        #[command(subcommand)]
        command: ModelsCommand,
    },

    /// Tool groups and the auto-selection mode.
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List the model roster (seeds the backend with built-in providers if it has none).
    List,
    /// Show the current model.
    Current,
    /// Make NAME the current model.
    Use { name: String },
    /// Check that NAME's endpoint and key are accepted by its provider.
    Check { name: String },
    /// Set the API key of NAME and save the roster.
    SetKey { name: String, key: String },
    /// Add or update NAME and save the roster.
    Set {
        name: String,
        /// Provider-side model id
        #[arg(long)]
        id: Option<String>,
        /// API base URL
        #[arg(long)]
        url: Option<String>,
        /// API key
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove NAME and save the roster.
    Remove { name: String },
}

#[derive(Subcommand)]
enum ToolsCommand {
    /// List tool groups, their tools, and which groups are enabled.
    List,
    /// Enable the given groups (others unchanged).
    Enable {
        #[arg(required = true)]
        groups: Vec<String>,
    },
    /// Disable the given groups (others unchanged).
    Disable {
        #[arg(required = true)]
        groups: Vec<String>,
    },
    /// Replace the enabled set with exactly the given groups.
    Set { groups: Vec<String> },
    /// Show or set automatic tool selection.
    Auto { mode: Option<Toggle> },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Serialize)]
struct ModelView {
    name: String,
    id: String,
    url: String,
    api_key: String,
    current: bool,
}

#[derive(Serialize)]
struct GroupView {
    name: String,
    enabled: bool,
    tools: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ToolsView {
    auto_select: bool,
    groups: Vec<GroupView>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let ok = match cli.command {
        Some(Commands::Version) => {
            println!("agentcfg {}", env!("CARGO_PKG_VERSION"));
            true
        }
        Some(Commands::Init) => match run_init(cli.config) {
            Ok(()) => true,
            Err(e) => {
                log::error!("init failed: {:#}", e);
                false
            }
        },
        Some(Commands::Models { command }) => match client(cli.config, cli.backend.as_deref()) {
            Ok(client) => run_models(client, command, cli.json).await,
            Err(e) => {
                log::error!("{:#}", e);
                false
            }
        },
        Some(Commands::Tools { command }) => match client(cli.config, cli.backend.as_deref()) {
            Ok(client) => run_tools(client, command, cli.json).await,
            Err(e) => {
                log::error!("{:#}", e);
                false
            }
        },
        None => {
            println!("Run with --help for usage");
            true
        }
    };
    if !ok {
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(agentcfg::config::default_config_path);
    let dir = agentcfg::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

fn client(config_path: Option<PathBuf>, backend: Option<&str>) -> anyhow::Result<BackendClient> {
    let (config, _) = agentcfg::config::load_config(config_path)?;
    let client = BackendClient::from_config(&config, backend)?;
    log::debug!("using backend {}", client.base_url());
    Ok(client)
}

/// Print `result` as JSON envelope or human text. Returns false on error.
fn report<T: Serialize>(json: bool, result: Result<T, SyncError>, human: impl FnOnce(&T)) -> bool {
    if json {
        let envelope: ApiResponse<T> = result.into();
        let ok = envelope.is_ok();
        match serde_json::to_string_pretty(&envelope) {
            Ok(s) => println!("{}", s),
            Err(e) => log::error!("serializing output: {}", e),
        }
        return ok;
    }
    match result {
        Ok(data) => {
            human(&data);
            true
        }
        Err(e) => {
            match e.details() {
                Some(d) => eprintln!("error: {} ({})", e.error(), d),
                None => eprintln!("error: {}", e.error()),
            }
            false
        }
    }
}

fn model_views(registry: &ModelRegistry) -> Vec<ModelView> {
    registry
        .models()
        .iter()
        .map(|m| ModelView {
            name: m.name.clone(),
            id: m.id.clone(),
            url: m.url.clone(),
            api_key: m.masked_key(),
            current: registry.current() == Some(m.name.as_str()),
        })
        .collect()
}

async fn loaded_model_dialog(client: BackendClient) -> Result<ModelDialog, SyncError> {
    let mut dialog = ModelDialog::new(client, presets::seed_registry());
    dialog.load().await?;
    Ok(dialog)
}

/// Existing entry, else a preset, else a blank config carrying just the name.
fn base_config(registry: &ModelRegistry, name: &str) -> ModelConfig {
    registry
        .get(name)
        .cloned()
        .or_else(|| presets::find(name).map(|p| p.to_config()))
        .unwrap_or_else(|| ModelConfig {
            name: name.to_string(),
            ..ModelConfig::default()
        })
}

async fn edit_and_save(
    client: BackendClient,
    edit: impl FnOnce(&mut ModelDialog) -> Result<(), SyncError>,
) -> Result<String, SyncError> {
    let mut dialog = loaded_model_dialog(client).await?;
    edit(&mut dialog)?;
    dialog.save().await
}

async fn run_models(client: BackendClient, command: ModelsCommand, json: bool) -> bool {
    match command {
        ModelsCommand::List => {
            let result = loaded_model_dialog(client)
                .await
                .map(|d| model_views(d.registry()));
            report(json, result, |models| {
                for m in models {
                    let marker = if m.current { "*" } else { " " };
                    let key = match (m.api_key.is_empty(), presets::find(&m.name)) {
                        (false, _) => m.api_key.clone(),
                        (true, Some(p)) => format!("(no key, get one at {})", p.api_keys_url),
                        (true, None) => "(no key)".to_string(),
                    };
                    println!("{} {:<12} {:<40} {} {}", marker, m.name, m.id, m.url, key);
                }
            })
        }
        ModelsCommand::Current => {
            let result = client.get_current_model().await;
            report(json, result, |current| match current {
                Some(name) => println!("{}", name),
                None => println!("(none)"),
            })
        }
        ModelsCommand::Use { name } => {
            let mut dialog = ModelDialog::new(client, ModelRegistry::default());
            let result = dialog.select(&name).await;
            report(json, result, |msg| println!("{}", msg))
        }
        ModelsCommand::Check { name } => {
            let result = match loaded_model_dialog(client).await {
                Ok(mut dialog) => dialog.probe(&name).await,
                Err(e) => Err(e),
            };
            report(json, result, |msg| println!("ok: {}", msg))
        }
        ModelsCommand::SetKey { name, key } => {
            let result = edit_and_save(client, |dialog| {
                let existing = dialog
                    .registry()
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| SyncError::InvalidInput(format!("unknown model: {}", name)))?;
                dialog.edit(ModelConfig {
                    api_key: key,
                    ..existing
                });
                Ok(())
            })
            .await;
            report(json, result, |msg| println!("{}", msg))
        }
        ModelsCommand::Set { name, id, url, key } => {
            let result = edit_and_save(client, |dialog| {
                let mut config = base_config(dialog.registry(), &name);
                if let Some(id) = id {
                    config.id = id;
                }
                if let Some(url) = url {
                    config.url = url;
                }
                if let Some(key) = key {
                    config.api_key = key;
                }
                config.validate()?;
                dialog.edit(config);
                Ok(())
            })
            .await;
            report(json, result, |msg| println!("{}", msg))
        }
        ModelsCommand::Remove { name } => {
            let result = edit_and_save(client, |dialog| {
                if dialog.remove(&name) {
                    Ok(())
                } else {
                    Err(SyncError::InvalidInput(format!("unknown model: {}", name)))
                }
            })
            .await;
            report(json, result, |msg| println!("{}", msg))
        }
    }
}

fn tools_view(sel: &ToolSelection) -> ToolsView {
    ToolsView {
        auto_select: sel.auto_select,
        groups: sel
            .catalog
            .iter()
            .map(|(name, tools)| GroupView {
                name: name.clone(),
                enabled: sel.is_enabled(name),
                tools: tools.clone(),
            })
            .collect(),
    }
}

fn print_tools(view: &ToolsView) {
    println!(
        "automatic tool selection: {}",
        if view.auto_select { "on" } else { "off" }
    );
    for group in &view.groups {
        let marker = if group.enabled { "[x]" } else { "[ ]" };
        let (title, subtitle) = group_label(&group.name);
        match subtitle {
            Some(sub) => println!("{} {} ({}) - {} tools", marker, title, sub, group.tools.len()),
            None => println!("{} {} - {} tools", marker, title, group.tools.len()),
        }
        for (tool, description) in &group.tools {
            println!("      {}: {}", tool, description);
        }
    }
}

/// Open a tool dialog, apply `enabled` to each group, confirm. Returns the final enabled set.
async fn toggle_groups(
    client: BackendClient,
    groups: &[String],
    enabled: bool,
) -> Result<Vec<String>, SyncError> {
    let mut dialog = ToolDialog::new(client);
    dialog.try_open().await?;
    for group in groups {
        dialog.toggle_group(group, enabled)?;
    }
    let final_set: Vec<String> = dialog
        .selection()
        .map(|sel| sel.enabled.iter().cloned().collect())
        .unwrap_or_default();
    let message = dialog.confirm().await?;
    log::info!("{}", message);
    Ok(final_set)
}

async fn run_tools(client: BackendClient, command: ToolsCommand, json: bool) -> bool {
    match command {
        ToolsCommand::List => {
            let mut dialog = ToolDialog::new(client);
            let result = dialog.try_open().await.map(|sel| tools_view(&sel));
            report(json, result, print_tools)
        }
        ToolsCommand::Enable { groups } => {
            let result = toggle_groups(client, &groups, true).await;
            report(json, result, |set| println!("enabled: {}", set.join(", ")))
        }
        ToolsCommand::Disable { groups } => {
            let result = toggle_groups(client, &groups, false).await;
            report(json, result, |set| println!("enabled: {}", set.join(", ")))
        }
        ToolsCommand::Set { groups } => {
            let result = client.save_enabled_groups(&groups).await;
            report(json, result, |msg| println!("{}", msg))
        }
        ToolsCommand::Auto { mode: None } => {
            let result = client.get_auto_selection_mode().await;
            report(json, result, |on| println!("{}", if *on { "on" } else { "off" }))
        }
        ToolsCommand::Auto { mode: Some(mode) } => {
            let result = client
                .set_auto_selection_mode(matches!(mode, Toggle::On))
                .await;
            report(json, result, |msg| println!("{}", msg))
        }
    }
}
