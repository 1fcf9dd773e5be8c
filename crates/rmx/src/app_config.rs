//! 🔧 App Configuration — the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! 🧠 Knowledge graph:
//! - `route_manager` → `backends::RouteManagerConfig` (lives next to the HTTP client)
//! - `source` / `sink` → `backends::{SourceConfig, SinkConfig}`
//! - `migration` → which operation, which environment, where backups go

use anyhow::Context;
use serde::Deserialize;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::backends::{RouteManagerConfig, SinkConfig, SourceConfig};
use crate::transforms::{MigrationContext, Operation};

/// 📦 The AppConfig: one struct to rule them all, one struct to find them,
/// one struct to bring them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 📡 Where the routes live and how to knock on its door.
    #[serde(default)]
    pub route_manager: RouteManagerConfig,
    /// 🎯 What we're doing to the routes this time.
    pub migration: MigrationConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

/// 🎯 The migration itself: one operation per run, on purpose.
#[derive(Debug, Deserialize, Clone)]
pub struct MigrationConfig {
    /// e.g. `"encode-queues"`, `"collapse-endpoint-pattern"`
    pub operation: Operation,
    /// 🌍 The environment baked into special targets like `emx-core-trash#<env>`.
    /// Also picks the credential keys (`emxaccount<env>.username`).
    #[serde(default = "default_queue_environment")]
    pub queue_environment: String,
    /// 💾 Write the fetched document to disk before touching anything. Leave this on.
    #[serde(default = "default_backup")]
    pub backup: bool,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    /// 🧵 How many update calls may be in flight at once. 1 = the old, polite, serial way.
    #[serde(default = "default_update_parallelism")]
    pub update_parallelism: usize,
    /// ⏪ Resubmit the source document exactly as it is, no operation applied.
    /// Point `source` at a backup and this puts the routes back the way they were.
    #[serde(default)]
    pub restore: bool,
}

// 🌍 dev, because nobody's first run should be against prod
fn default_queue_environment() -> String {
    "dev".to_string()
}

fn default_backup() -> bool {
    true
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_update_parallelism() -> usize {
    1
}

impl MigrationConfig {
    pub fn context(&self) -> MigrationContext {
        MigrationContext::new(self.queue_environment.clone())
    }
}

/// 🚀 Load the config — from a file, from env vars, or from the sheer power of hoping.
///
/// 🔧 Merges environment variables (`RMX_*`, nested with `__`, e.g.
/// `RMX_MIGRATION__OPERATION=encode-queues`) with an optional TOML file.
///   - `None`  → env vars only.
///   - `Some`  → env vars + TOML file, merged. TOML wins on conflicts.
///
/// 💀 Returns an error if config is unparseable. The message says which layer to blame.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("RMX_").split("__"));

    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (RMX_*). \
             Is `migration.operation` set? It's the one thing we refuse to guess.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (RMX_*). \
                 No file was provided — this one's all on the environment. Classic."
            .to_string(),
    };

    config.extract().context(context_msg)
}
