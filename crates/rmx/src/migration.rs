//! 🎬 The migration — fetch, back up, transform, put back. In that order. Always.
//!
//! ```text
//!   source ──raw──▶ backup (if remote) ──▶ parse ──▶ RouteBatchTransformer ──▶ sink
//! ```
//!
//! The backup lands before a single route is parsed. The transform is pure. The route
//! manager gets at most `update_parallelism` routes at a time; local sinks get them one
//! by one, in order. The first call a sink refuses ends the run. Whatever already went
//! through stays there; the backup is how you get back, with `restore` set. 🦆

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use futures::stream::{self, TryStreamExt};
use tracing::{info, warn};

use crate::app_config::{AppConfig, MigrationConfig};
use crate::backends::{
    FileSink, FileSource, InMemorySink, RouteManagerClient, RouteManagerSink, RouteManagerSource,
    RouteSink, RouteSource, SinkBackend, SinkConfig, SourceBackend, SourceConfig, backup,
};
use crate::common::RoutesList;
use crate::credentials::Credentials;
use crate::progress::SubmitProgress;
use crate::transforms::{BatchOutcome, Operation, RouteBatchTransformer, RouteFailure};

/// 📋 How the run went. Printed as a table at the end, kept as a struct for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    pub operation: Operation,
    /// ⏪ the source was resubmitted verbatim, `operation` was not applied
    pub restored: bool,
    pub source: String,
    pub sink: String,
    /// 💾 where the fetched document was saved, if it was
    pub backup: Option<PathBuf>,
    pub fetched: usize,
    pub submitted: usize,
    /// 🗑️ uuids of routes left with no queues
    pub dropped: Vec<String>,
    pub failed: Vec<RouteFailure>,
}

impl MigrationSummary {
    /// 🍽️ One row per fact, then one row per route that didn't make it.
    pub fn render_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        let what = if self.restored {
            format!("restore (undoing {})", self.operation)
        } else {
            self.operation.to_string()
        };
        table.set_header(vec![Cell::new("migration"), Cell::new(what)]);
        table.add_row(vec![Cell::new("source"), Cell::new(&self.source)]);
        table.add_row(vec![Cell::new("sink"), Cell::new(&self.sink)]);
        table.add_row(vec![
            Cell::new("backup"),
            Cell::new(
                self.backup
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
        table.add_row(vec![Cell::new("fetched"), Cell::new(self.fetched)]);
        table.add_row(vec![Cell::new("submitted"), Cell::new(self.submitted)]);
        table.add_row(vec![Cell::new("dropped (no queues left)"), Cell::new(self.dropped.len())]);
        table.add_row(vec![Cell::new("failed"), Cell::new(self.failed.len())]);
        for uuid in &self.dropped {
            table.add_row(vec![Cell::new("🗑️ dropped"), Cell::new(uuid)]);
        }
        for failure in &self.failed {
            table.add_row(vec![
                Cell::new("💀 failed"),
                Cell::new(format!("{} ({}): {}", failure.name, failure.uuid, failure.error)),
            ]);
        }
        table
    }
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_table())
    }
}

/// 🚀 Build the backends the config asks for, then [`migrate`].
pub async fn run(app_config: AppConfig) -> Result<MigrationSummary> {
    let (mut source, sink) = build_backends(&app_config)?;
    migrate(&mut source, &sink, &app_config.migration).await
}

/// 🔄 The run loop over already-built backends.
pub async fn migrate(
    source: &mut SourceBackend,
    sink: &SinkBackend,
    migration: &MigrationConfig,
) -> Result<MigrationSummary> {
    let operation = migration.operation;
    info!("🚀 {} from {} to {}", operation, source.describe(), sink.describe());

    let raw = source
        .load_document()
        .await
        .context(format!("💀 Couldn't load routes from {}", source.describe()))?;

    // 💾 before parsing: a document we can't parse is exactly the one worth keeping
    let backup = if source.is_remote() && migration.backup {
        Some(backup::write_backup(&migration.backup_dir, &raw).await?)
    } else {
        None
    };

    let routes = RoutesList::parse(&raw)?.routes;
    info!("📦 {} routes fetched", routes.len());

    let outcome = if migration.restore {
        info!("⏪ restoring {} routes exactly as {} has them", routes.len(), source.describe());
        BatchOutcome {
            routes: routes.clone(),
            ..BatchOutcome::default()
        }
    } else {
        RouteBatchTransformer::new(operation, migration.context()).apply(&routes)
    };
    if !outcome.failed.is_empty() {
        warn!("💀 {} routes skipped, their remote copies stay untouched", outcome.failed.len());
    }

    // -- 🔢 a local sink writes in arrival order, so it only ever sees one route at a time
    let in_flight = if sink.is_remote() {
        migration.update_parallelism.max(1)
    } else {
        1
    };
    let progress = SubmitProgress::new(sink.describe(), outcome.routes.len() as u64);
    let progress_ref = &progress;
    stream::iter(outcome.routes.iter().map(Ok::<_, anyhow::Error>))
        .try_for_each_concurrent(in_flight, |route| async move {
            sink.submit(route).await?;
            progress_ref.tick();
            Ok(())
        })
        .await
        .context(format!(
            "💀 Submitting to {} stopped after {} of {} routes. \
             The backup has the originals if you need to revert.",
            sink.describe(),
            progress.position(),
            outcome.routes.len()
        ))?;
    progress.finish();

    sink.close()
        .await
        .context(format!("💀 Couldn't close {}", sink.describe()))?;
    info!("✅ {} routes submitted to {}", outcome.routes.len(), sink.describe());

    Ok(MigrationSummary {
        operation,
        restored: migration.restore,
        source: source.describe(),
        sink: sink.describe(),
        backup,
        fetched: routes.len(),
        submitted: outcome.routes.len(),
        dropped: outcome.dropped,
        failed: outcome.failed,
    })
}

// -- 🏭 one client, shared by source and sink, only if either of them needs it
fn build_backends(app_config: &AppConfig) -> Result<(SourceBackend, SinkBackend)> {
    let needs_client = matches!(app_config.source, SourceConfig::RouteManager)
        || matches!(app_config.sink, SinkConfig::RouteManager);
    let client = if needs_client {
        let credentials = Credentials::resolve(
            &app_config.route_manager,
            &app_config.migration.queue_environment,
        )?;
        Some(RouteManagerClient::new(&app_config.route_manager, credentials)?)
    } else {
        None
    };

    let client_for = |end: &str| -> Result<RouteManagerClient> {
        client
            .clone()
            .context(format!("💀 The route manager {end} was configured without a client"))
    };

    let source = match &app_config.source {
        SourceConfig::RouteManager => SourceBackend::RouteManager(RouteManagerSource::new(client_for("source")?)),
        SourceConfig::File(file_config) => SourceBackend::File(FileSource::new(file_config.clone())),
    };

    let sink = match &app_config.sink {
        SinkConfig::RouteManager => SinkBackend::RouteManager(RouteManagerSink::new(client_for("sink")?)),
        SinkConfig::File(file_config) => SinkBackend::File(FileSink::new(file_config.clone())),
        SinkConfig::Discard => SinkBackend::InMemory(InMemorySink::new()),
    };

    Ok((source, sink))
}
