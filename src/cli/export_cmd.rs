//! `crumb export`: flatten saved snapshots into a CSV file.

use crate::export;
use crate::store;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(out: PathBuf, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(store::default_snapshot_dir);
    let records = store::load_records(&dir)?;

    if records.is_empty() {
        println!("No data to export");
        return Ok(());
    }

    let (cookies, storage) = export::export_csv(&records, &out)?;
    println!(
        "Exported {cookies} cookies and {storage} storage items to {}",
        out.display()
    );

    Ok(())
}
