//! `crumb collect`: visit sites and persist one snapshot per site.

use crate::collector::browser::{BrowserCollector, BrowserOptions};
use crate::collector::http::HttpCollector;
use crate::collector::Collector;
use crate::orchestrator::Orchestrator;
use crate::store;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

pub struct CollectArgs {
    pub sites: Vec<String>,
    pub no_browser: bool,
    pub headed: bool,
    pub wait_secs: u64,
    pub timeout_ms: u64,
    pub dir: Option<PathBuf>,
}

pub async fn run(args: CollectArgs) -> Result<()> {
    let mut collectors: Vec<Box<dyn Collector>> =
        vec![Box::new(HttpCollector::new(args.timeout_ms))];
    if !args.no_browser {
        collectors.push(Box::new(BrowserCollector::new(BrowserOptions {
            headless: !args.headed,
            settle_wait: Duration::from_secs(args.wait_secs),
            navigation_timeout_ms: args.timeout_ms,
        })));
    }

    let dir = args.dir.unwrap_or_else(store::default_snapshot_dir);

    let orchestrator = Orchestrator::new(collectors);
    let records = orchestrator.run(&args.sites).await;

    let mut total_cookies = 0;
    let mut total_storage = 0;
    let mut failed_sites = 0;
    for record in &records {
        total_cookies += record.cookies.len();
        total_storage += record.storage_items.len();
        if !record.collector_errors.is_empty() {
            failed_sites += 1;
        }
        let path = store::save_record(&dir, record)?;
        println!("{} -> {}", record.domain, path.display());
    }

    println!();
    println!(
        "Collected {total_cookies} cookies and {total_storage} storage items from {} site(s).",
        records.len()
    );
    if failed_sites > 0 {
        println!("{failed_sites} site(s) had collection failures; see the snapshot notes.");
    }
    println!("Snapshots written to {}", dir.display());

    Ok(())
}
