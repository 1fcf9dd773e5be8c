//! 💾 Backups — the routes document, on disk, before anyone gets clever.
//!
//! Exact bytes. No parsing, no pretty-printing, no opinions. A backup that
//! reformats what it saved is a rumor, not a backup.
//!
//! Named `OriginalRoutes<local timestamp>.json`, e.g.
//! `OriginalRoutes2025-06-07T08-09-10.500000.json`. Fixed width and no colons, so
//! it's a valid name everywhere and the newest backup is the last one by name. 🦆

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const BACKUP_PREFIX: &str = "OriginalRoutes";
const BACKUP_SUFFIX: &str = ".json";
const STAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.6f";

/// 💾 Write `raw` verbatim to a fresh, timestamped file in `dir`. Creates `dir` if needed.
pub async fn write_backup(dir: &Path, raw: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .context(format!("💀 Couldn't create backup directory '{}'", dir.display()))?;

    let stamp = chrono::Local::now().format(STAMP_FORMAT);
    let path = dir.join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}"));
    tokio::fs::write(&path, raw).await.context(format!(
        "💀 Couldn't write the backup '{}'. Nothing was changed. Nothing will be, until this works.",
        path.display()
    ))?;
    info!("💾 backed up {} bytes of routes to {}", raw.len(), path.display());
    Ok(path)
}

/// 🔍 The newest `OriginalRoutes*.json` in `dir`, if there is one.
pub async fn latest_backup(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .context(format!("💀 Couldn't list backup directory '{}'", dir.display()))?;

    let mut newest: Option<(String, PathBuf)> = None;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !(name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX)) {
            continue;
        }
        if newest.as_ref().is_none_or(|(best, _)| name > *best) {
            newest = Some((name, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn the_one_where_the_backup_keeps_every_byte() -> Result<()> {
        let the_dir = tempfile::tempdir()?;
        let the_raw = "{ \"routesList\" : [ ] }\n";

        let the_path = write_backup(&the_dir.path().join("nested/backups"), the_raw).await?;

        let the_name = the_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        assert!(the_name.starts_with("OriginalRoutes"), "{the_name}");
        assert!(the_name.ends_with(".json"), "{the_name}");
        assert!(!the_name.contains(':'), "{the_name}");
        // -- 📏 "OriginalRoutes" + "YYYY-MM-DDTHH-MM-SS.ffffff" + ".json"
        assert_eq!(the_name.len(), "OriginalRoutes".len() + 26 + ".json".len(), "{the_name}");
        assert_eq!(tokio::fs::read_to_string(&the_path).await?, the_raw);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_newest_backup_wins_by_name() -> Result<()> {
        let the_dir = tempfile::tempdir()?;
        for name in [
            "OriginalRoutes2024-01-02T03-04-05.000001.json",
            "OriginalRoutes2025-06-07T08-09-10.500000.json",
            "transformed-routes.json",
            "OriginalRoutes-notes.txt",
        ] {
            tokio::fs::write(the_dir.path().join(name), "{}").await?;
        }

        let the_latest = latest_backup(the_dir.path()).await?;
        assert_eq!(
            the_latest,
            Some(the_dir.path().join("OriginalRoutes2025-06-07T08-09-10.500000.json"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_an_empty_directory_has_no_backup() -> Result<()> {
        let the_dir = tempfile::tempdir()?;
        assert_eq!(latest_backup(the_dir.path()).await?, None);
        Ok(())
    }
}
