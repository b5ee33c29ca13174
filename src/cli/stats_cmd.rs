//! `crumb stats`: aggregate saved snapshots and print the report.

use crate::stats;
use crate::store;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(dir: Option<PathBuf>, top_n: usize, json: bool) -> Result<()> {
    let dir = dir.unwrap_or_else(store::default_snapshot_dir);
    let records = store::load_records(&dir)?;

    if records.is_empty() {
        println!(
            "No snapshots found in {}. Run `crumb collect <sites>` first.",
            dir.display()
        );
        return Ok(());
    }

    let snapshot = stats::compute(&records, top_n);
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", stats::report::render(&snapshot));
    }

    Ok(())
}
