//! 🚀 rmx — route migration for the EMX route manager.
//!
//! 🎬 Two naming schemes walk into a dispatch service. Only one walks out.
//!
//! The pure part lives in [`transforms`]: queue-target codecs, rule header
//! rewriters, endpoint-pattern expand/collapse, qualifier normalization, and the
//! batch transformer that runs one of them over every route. No I/O in there. 🦆
//!
//! Everything that touches a socket or a disk lives in [`backends`], and
//! [`migration`] strings the two together.

pub mod app_config;
pub mod backends;
pub mod common;
pub mod credentials;
pub mod error;
pub mod migration;
mod progress;
pub mod transforms;

pub use app_config::{AppConfig, MigrationConfig, load_config};
pub use common::{Route, RoutesList};
pub use error::TransformError;
pub use migration::MigrationSummary;
pub use transforms::{BatchOutcome, MigrationContext, Operation, RouteBatchTransformer};

/// 🚀 Run the migration the config describes. Load it, do it.
pub async fn run(app_config: AppConfig) -> anyhow::Result<MigrationSummary> {
    migration::run(app_config).await
}
