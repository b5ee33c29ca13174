//! Snapshot store: one pretty-printed JSON file per site per run, under a
//! directory the stats and export commands read back.

use crate::record::CollectionRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default snapshot directory, `~/.crumb/snapshots`.
pub fn default_snapshot_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".crumb")
        .join("snapshots")
}

/// Write one record to `<dir>/<domain>_<timestamp>.json` and return the
/// path. Anything outside `[A-Za-z0-9-]` in the domain becomes an
/// underscore so the name is portable.
pub fn save_record(dir: &Path, record: &CollectionRecord) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot directory {}", dir.display()))?;

    let safe_domain: String = record
        .domain
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let filename = format!(
        "{safe_domain}_{}.json",
        record.collected_at.format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(filename);

    let json = serde_json::to_string_pretty(record).context("failed to serialize record")?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;

    Ok(path)
}

/// Load every `.json` snapshot under `dir`, in filename order. A missing
/// directory means nothing has been collected yet and yields an empty set.
/// Unreadable or unparseable files are skipped with a warning so one bad
/// snapshot never blocks a stats run.
pub fn load_records(dir: &Path) -> Result<Vec<CollectionRecord>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read snapshot directory {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("skipping unreadable snapshot {}: {e}", path.display());
                continue;
            }
        };
        match serde_json::from_str::<CollectionRecord>(&contents) {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping malformed snapshot {}: {e}", path.display()),
        }
    }

    Ok(records)
}
