//! Record merger: reconciles cookies seen by different collectors into one
//! canonical per-domain set, and deduplicates storage snapshots.
//!
//! The overlay order is a contract: HTTP-sourced cookies go in first and a
//! later (browser-sourced) observation of the same identity key replaces
//! them wholesale, because the browser sees the fully-rendered, post-script
//! state. HTTP-only data survives only for cookies the browser pass never
//! re-observed.

use crate::record::{CookieRecord, StorageItem};
use std::collections::HashMap;

/// Overlay `overlay` onto `base`, deduplicating by identity key.
///
/// Insertion order is preserved for first-seen keys; on collision the
/// overlay cookie's attributes win in place and the provenance combines
/// (`http` + `browser` → `both`). Deterministic and idempotent.
pub fn overlay_cookies(base: Vec<CookieRecord>, overlay: Vec<CookieRecord>) -> Vec<CookieRecord> {
    let mut merged: Vec<CookieRecord> = Vec::with_capacity(base.len() + overlay.len());
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();

    for cookie in base.into_iter().chain(overlay) {
        let key = cookie.identity_key();
        match index.get(&key) {
            Some(&slot) => {
                let source = merged[slot].source.combine(cookie.source);
                merged[slot] = CookieRecord { source, ..cookie };
            }
            None => {
                index.insert(key, merged.len());
                merged.push(cookie);
            }
        }
    }

    merged
}

/// Deduplicate storage items by `(domain, kind, key)`, last write wins.
/// Order of first appearance is kept.
pub fn dedupe_storage(items: Vec<StorageItem>) -> Vec<StorageItem> {
    let mut merged: Vec<StorageItem> = Vec::with_capacity(items.len());
    let mut index: HashMap<(String, crate::record::StorageKind, String), usize> = HashMap::new();

    for item in items {
        let key = item.identity_key();
        match index.get(&key) {
            Some(&slot) => merged[slot] = item,
            None => {
                index.insert(key, merged.len());
                merged.push(item);
            }
        }
    }

    merged
}
