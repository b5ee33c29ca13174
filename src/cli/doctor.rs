//! Environment readiness check.

use crate::collector::chromium::find_chromium;
use crate::store;
use anyhow::Result;
use std::fs;

/// Check Chromium availability and snapshot directory writability.
pub fn run() -> Result<()> {
    println!("Crumb Doctor");
    println!("============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome or set CRUMB_CHROMIUM_PATH. \
             Collection still works with --no-browser (HTTP pass only)."
        ),
    }

    let dir = store::default_snapshot_dir();
    let dir_writable = match fs::create_dir_all(&dir) {
        Ok(()) => {
            println!("[OK] Snapshot directory writable: {}", dir.display());
            true
        }
        Err(e) => {
            println!("[!!] Snapshot directory not writable: {} ({e})", dir.display());
            false
        }
    };

    println!();
    if dir_writable {
        if chromium_path.is_some() {
            println!("Status: READY");
        } else {
            println!("Status: READY (HTTP collection only)");
        }
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
