//! Flat CSV export of collection records, one row per cookie or storage
//! item, for analysis in spreadsheet tools.

use crate::record::CollectionRecord;
use anyhow::{Context, Result};
use std::path::Path;

const HEADER: [&str; 12] = [
    "entry",
    "domain",
    "collected_at",
    "name",
    "value",
    "cookie_domain",
    "path",
    "expires",
    "secure",
    "http_only",
    "same_site",
    "source",
];

/// Write every cookie and storage item to `out` as CSV. Returns the number
/// of cookie rows and storage rows written. Storage items reuse the cookie
/// columns: `path`, `expires` and the flag columns are blank, and `source`
/// carries the storage area instead.
pub fn export_csv(records: &[CollectionRecord], out: &Path) -> Result<(usize, usize)> {
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("failed to create {}", out.display()))?;

    writer.write_record(HEADER).context("failed to write CSV header")?;

    let mut cookie_rows = 0;
    let mut storage_rows = 0;
    for record in records {
        let collected_at = record.collected_at.to_rfc3339();

        for cookie in &record.cookies {
            let expires = cookie
                .expires
                .map(|e| e.to_rfc3339())
                .unwrap_or_default();
            let same_site = cookie.same_site.to_string();
            let source = cookie.source.to_string();
            writer
                .write_record([
                    "cookie",
                    record.domain.as_str(),
                    collected_at.as_str(),
                    cookie.name.as_str(),
                    cookie.value.as_str(),
                    cookie.domain.as_str(),
                    cookie.path.as_str(),
                    expires.as_str(),
                    if cookie.secure { "true" } else { "false" },
                    if cookie.http_only { "true" } else { "false" },
                    same_site.as_str(),
                    source.as_str(),
                ])
                .context("failed to write cookie row")?;
            cookie_rows += 1;
        }

        for item in &record.storage_items {
            let kind = item.kind.to_string();
            writer
                .write_record([
                    "storage",
                    record.domain.as_str(),
                    collected_at.as_str(),
                    item.key.as_str(),
                    item.value.as_str(),
                    item.domain.as_str(),
                    "",
                    "",
                    "",
                    "",
                    "",
                    kind.as_str(),
                ])
                .context("failed to write storage row")?;
            storage_rows += 1;
        }
    }

    writer.flush().context("failed to flush CSV output")?;
    Ok((cookie_rows, storage_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        CookieRecord, CookieSource, SameSite, StorageItem, StorageKind,
    };
    use chrono::Utc;

    #[test]
    fn test_export_writes_cookie_and_storage_rows() {
        let record = CollectionRecord {
            domain: "example.com".to_string(),
            url: "https://example.com/".to_string(),
            collected_at: Utc::now(),
            cookies: vec![CookieRecord {
                name: "sid".to_string(),
                value: "v,with,commas".to_string(),
                domain: "example.com".to_string(),
                path: "/".to_string(),
                expires: None,
                secure: true,
                http_only: false,
                same_site: SameSite::Lax,
                source: CookieSource::Both,
            }],
            storage_items: vec![StorageItem {
                kind: StorageKind::Local,
                key: "theme".to_string(),
                value: "dark".to_string(),
                domain: "example.com".to_string(),
            }],
            collector_errors: vec![],
        };

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("export.csv");
        let (cookies, storage) = export_csv(&[record], &out).unwrap();
        assert_eq!(cookies, 1);
        assert_eq!(storage, 1);

        let contents = std::fs::read_to_string(&out).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("entry,domain,collected_at"));
        let cookie_row = lines.next().unwrap();
        assert!(cookie_row.starts_with("cookie,example.com,"));
        assert!(cookie_row.contains("\"v,with,commas\""));
        assert!(cookie_row.ends_with(",Lax,both"));
        let storage_row = lines.next().unwrap();
        assert!(storage_row.starts_with("storage,example.com,"));
        assert!(storage_row.ends_with(",local"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_export_empty_records() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("export.csv");
        let (cookies, storage) = export_csv(&[], &out).unwrap();
        assert_eq!((cookies, storage), (0, 0));
        let contents = std::fs::read_to_string(&out).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }
}
