// ai
//! 📂 Previously, on "Things That Could Go Wrong With A File"...
//!
//! The backup was there. It had a timestamp in its name and every route in its
//! belly. Then someone needed to revert, and the file became a source.
//! Then someone wanted a dry run, and a file became a sink.
//!
//! 🚰 backup file → FileSource → transforms → FileSink → `transformed-routes.json`
//! 💀 Disk full → your problem now
//! 🦆 (mandatory, no notes)

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, trace};

use crate::backends::{RouteSink, RouteSource};
use crate::common::{Route, RoutesList};

// 📂 FileSourceConfig — lives next to the FileSource that uses it. One backend, one config, one file.
#[derive(Debug, Deserialize, Clone)]
pub struct FileSourceConfig {
    pub file_name: PathBuf,
}

// 🚰 FileSinkConfig — same deal, other direction.
#[derive(Debug, Deserialize, Clone)]
pub struct FileSinkConfig {
    pub file_name: PathBuf,
}

/// 📂 Reads a whole routes document from disk. Usually a backup. Sometimes a hand-edited one. We don't ask.
#[derive(Debug)]
pub struct FileSource {
    source_config: FileSourceConfig,
}

impl FileSource {
    pub fn new(source_config: FileSourceConfig) -> Self {
        Self { source_config }
    }
}

#[async_trait]
impl RouteSource for FileSource {
    async fn load_document(&mut self) -> Result<String> {
        let path = &self.source_config.file_name;
        trace!("📂 reading routes document from {}", path.display());
        tokio::fs::read_to_string(path).await.context(format!(
            "💀 The routes file '{}' could not be read. \
            We stared at the path. The path stared back. \
            One of us was wrong about whether it existed.",
            path.display()
        ))
    }

    fn describe(&self) -> String {
        format!("file {}", self.source_config.file_name.display())
    }

    fn is_remote(&self) -> bool {
        false
    }
}

/// 🚰 Collects submitted routes and writes them as one `routesList` document on `close`.
///
/// Routes land in the file in submission order.
///
/// ⚠️ `close` truncates the target file if it exists. No warning. No backup. Just gone.
#[derive(Debug)]
pub struct FileSink {
    sink_config: FileSinkConfig,
    routes: Arc<Mutex<Vec<Route>>>,
}

impl FileSink {
    pub fn new(sink_config: FileSinkConfig) -> Self {
        Self {
            sink_config,
            routes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl RouteSink for FileSink {
    async fn submit(&self, route: &Route) -> Result<()> {
        self.routes.lock().await.push(route.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let routes = self.routes.lock().await.clone();
        let count = routes.len();
        let document = RoutesList::from(routes).to_json_pretty()?;
        let path = &self.sink_config.file_name;
        tokio::fs::write(path, document).await.context(format!(
            "💀 Error writing '{}'. The routes were SO CLOSE. They could SEE the disk.",
            path.display()
        ))?;
        info!("📝 wrote {} routes to {}", count, path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.sink_config.file_name.display())
    }

    fn is_remote(&self) -> bool {
        false
    }
}
