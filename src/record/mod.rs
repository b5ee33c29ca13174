//! Core record types: cookies, web-storage entries, and per-site collection
//! records. Everything here is a plain serde value object; once a record
//! leaves the orchestrator it is never mutated again.

pub mod merge;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cross-site send policy of a cookie. `Unspecified` means the attribute
/// was absent from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SameSite {
    None,
    Lax,
    Strict,
    Unspecified,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Lax => write!(f, "Lax"),
            Self::Strict => write!(f, "Strict"),
            Self::Unspecified => write!(f, "Unspecified"),
        }
    }
}

/// Which collection pass observed a cookie. Becomes `Both` when the merger
/// collapses an HTTP-sourced and a browser-sourced observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieSource {
    Http,
    Browser,
    Both,
}

impl CookieSource {
    /// Combine the provenance of two observations of the same cookie.
    pub fn combine(self, other: CookieSource) -> CookieSource {
        if self == other {
            self
        } else {
            CookieSource::Both
        }
    }
}

impl fmt::Display for CookieSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Browser => write!(f, "browser"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// One observed cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Absolute expiry; `None` means a session cookie.
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub source: CookieSource,
}

impl CookieRecord {
    /// Deduplication identity: two cookies with the same key are the same
    /// cookie observed by different collectors.
    pub fn identity_key(&self) -> (String, String, String) {
        (self.domain.clone(), self.name.clone(), self.path.clone())
    }

    /// Session cookies carry no expiry.
    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }
}

/// Which web-storage area an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Session,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// One `localStorage` or `sessionStorage` entry. Only the browser pass can
/// observe these; the HTTP pass has no script execution context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageItem {
    pub kind: StorageKind,
    pub key: String,
    pub value: String,
    pub domain: String,
}

impl StorageItem {
    /// Deduplication identity; last write wins on collision.
    pub fn identity_key(&self) -> (String, StorageKind, String) {
        (self.domain.clone(), self.kind, self.key.clone())
    }
}

/// Where in the per-site pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Resolve,
    Http,
    Browser,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Http => write!(f, "http"),
            Self::Browser => write!(f, "browser"),
        }
    }
}

/// A per-collector failure note. Failures degrade a site's data
/// completeness; they never abort the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorFailure {
    pub collector: FailureStage,
    pub message: String,
}

/// One site's result for one run: the merged cookie set, the storage
/// snapshot, and any failure notes. Emitted even when every collector
/// failed, so the run ledger stays complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    /// Canonical seed identity (the resolved host).
    pub domain: String,
    /// The seed URL that was visited.
    pub url: String,
    pub collected_at: DateTime<Utc>,
    pub cookies: Vec<CookieRecord>,
    pub storage_items: Vec<StorageItem>,
    pub collector_errors: Vec<CollectorFailure>,
}

impl CollectionRecord {
    /// Create an empty record for a site at the start of processing.
    pub fn new(domain: String, url: String, collected_at: DateTime<Utc>) -> Self {
        Self {
            domain,
            url,
            collected_at,
            cookies: Vec::new(),
            storage_items: Vec::new(),
            collector_errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, domain: &str, path: &str) -> CookieRecord {
        CookieRecord {
            name: name.to_string(),
            value: "v".to_string(),
            domain: domain.to_string(),
            path: path.to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::Unspecified,
            source: CookieSource::Http,
        }
    }

    #[test]
    fn test_identity_key_distinguishes_path() {
        let a = cookie("sid", "example.com", "/");
        let b = cookie("sid", "example.com", "/account");
        assert_ne!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_source_combine() {
        assert_eq!(
            CookieSource::Http.combine(CookieSource::Browser),
            CookieSource::Both
        );
        assert_eq!(
            CookieSource::Browser.combine(CookieSource::Browser),
            CookieSource::Browser
        );
        assert_eq!(
            CookieSource::Both.combine(CookieSource::Browser),
            CookieSource::Both
        );
    }

    #[test]
    fn test_record_schema_roundtrip() {
        let record = CollectionRecord {
            domain: "example.com".to_string(),
            url: "https://example.com/".to_string(),
            collected_at: Utc::now(),
            cookies: vec![CookieRecord {
                expires: Some(Utc::now()),
                secure: true,
                http_only: true,
                same_site: SameSite::Lax,
                source: CookieSource::Both,
                ..cookie("sid", "example.com", "/")
            }],
            storage_items: vec![StorageItem {
                kind: StorageKind::Local,
                key: "theme".to_string(),
                value: "dark".to_string(),
                domain: "example.com".to_string(),
            }],
            collector_errors: vec![CollectorFailure {
                collector: FailureStage::Browser,
                message: "launch failed".to_string(),
            }],
        };

        let json = serde_json::to_string_pretty(&record).unwrap();
        assert!(json.contains("\"source\": \"both\""));
        assert!(json.contains("\"kind\": \"local\""));
        assert!(json.contains("\"collector\": \"browser\""));

        let parsed: CollectionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
