//! 🚀 rmx-cli — the front door, the bouncer, the maitre d' of rmx.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 Parses args, sets up logging, loads config, and then lets the library do
//! the heavy lifting. Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rmx::backends::backup::latest_backup;
use rmx::backends::{FileSinkConfig, FileSourceConfig, SinkConfig, SourceConfig};
use rmx::{AppConfig, Operation};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 🔄 Migrate route manager routes between naming schemes.
#[derive(Debug, Parser)]
#[command(name = "rmx", version, about)]
struct Args {
    /// 🔧 TOML config file. Skipped if it doesn't exist; RMX_* env vars still apply.
    #[arg(default_value = "rmx.toml")]
    config: PathBuf,

    /// 🎯 Operation to run, overriding `migration.operation` (e.g. `encode-queues`).
    #[arg(long)]
    operation: Option<Operation>,

    /// ⏪ Put the routes back exactly as a backup has them. No operation is applied.
    #[arg(long)]
    revert: bool,

    /// 📂 Backup to revert from. Defaults to the newest `OriginalRoutes*.json` in `migration.backup_dir`.
    #[arg(long, requires = "revert")]
    from: Option<PathBuf>,

    /// 🧪 Write the transformed routes to `--out` instead of sending them anywhere.
    #[arg(long)]
    dry_run: bool,

    #[arg(long, default_value = "transformed-routes.json")]
    out: PathBuf,
}

/// 🚀 main() — where it all begins. The "I pressed F5 and held my breath" moment.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args
/// 3. Load config, then let the flags have the last word
/// 4. Run the thing (send it and pray 🙏)
/// 5. Handle errors (cry)
#[tokio::main]
async fn main() -> Result<()> {
    // 📡 println! debugging is a lifestyle choice we're trying to move past
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // 🔒 a missing file is fine, env vars might be carrying the whole config
    let config_file = args
        .config
        .try_exists()
        .context(format!(
            "💀 Couldn't check whether the configuration file exists. Was checking here: '{}'. \
             If it's a relative path, remember it's relative to where you ran this from.",
            args.config.display()
        ))?
        .then_some(args.config.as_path());

    let app_config = rmx::load_config(config_file).context(
        "💀 In rmx-cli, main, we couldn't load the config. Take a look at the file and the RMX_* env vars. \
         Make sure you didn't forget something obvious, like migration.operation.",
    )?;

    let result = match apply_flags(app_config, &args).await {
        Ok(app_config) => rmx::run(app_config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(summary) => {
            println!("{summary}");
            Ok(())
        }
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one layer at a time
            let mut the_vibes_are_giving_connection_issues = false;
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
                let cause_str = cause.to_string();
                if cause_str.contains("error sending request")
                    || cause_str.contains("connection refused")
                    || cause_str.contains("Connection refused")
                    || cause_str.contains("tcp connect error")
                    || cause_str.contains("dns error")
                    || cause_str.contains("operation timed out")
                {
                    the_vibes_are_giving_connection_issues = true;
                }
            }

            if the_vibes_are_giving_connection_issues {
                error!(
                    "🔧 hint: looks like the route manager isn't reachable. \
                     Double-check `route_manager.base_url`, your VPN, and whether the \
                     service is up. Even servers need a nudge sometimes. ☕"
                );
            }

            // 🗑️ Exit with prejudice.
            std::process::exit(1);
        }
    }
}

// -- 🎛️ flags beat config. --revert resubmits a backup verbatim; --dry-run swaps the sink for a file.
async fn apply_flags(mut app_config: AppConfig, args: &Args) -> Result<AppConfig> {
    if let Some(operation) = args.operation {
        app_config.migration.operation = operation;
    }

    if args.revert {
        let backup = match &args.from {
            Some(path) => path.clone(),
            None => latest_backup(&app_config.migration.backup_dir)
                .await?
                .with_context(|| {
                    format!(
                        "💀 No OriginalRoutes*.json in '{}'. Pass --from <file>.",
                        app_config.migration.backup_dir.display()
                    )
                })?,
        };
        info!(
            "⏪ undoing {} by restoring {} verbatim",
            app_config.migration.operation,
            backup.display()
        );
        app_config.migration.restore = true;
        app_config.source = SourceConfig::File(FileSourceConfig { file_name: backup });
    }

    if args.dry_run {
        info!("🧪 dry run, writing to {}", args.out.display());
        app_config.sink = SinkConfig::File(FileSinkConfig {
            file_name: args.out.clone(),
        });
    }

    Ok(app_config)
}
