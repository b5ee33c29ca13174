//! Site target resolver: turns a raw identifier (bare domain or full URL)
//! into a canonical fully-qualified seed URL.

use crate::collector::CollectError;
use url::Url;

/// Resolve a raw site identifier into a seed URL.
///
/// Bare hostnames get an `https` scheme; an explicit `http` scheme is
/// preserved. Fails with `InvalidTarget` when no host can be extracted.
pub fn resolve(raw: &str) -> Result<Url, CollectError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CollectError::InvalidTarget(raw.to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url =
        Url::parse(&candidate).map_err(|_| CollectError::InvalidTarget(raw.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CollectError::InvalidTarget(raw.to_string()));
    }
    if url.host_str().is_none() {
        return Err(CollectError::InvalidTarget(raw.to_string()));
    }

    Ok(url)
}

/// The canonical domain identity of a seed URL (its host, lowercased by
/// the URL parser).
pub fn canonical_domain(url: &Url) -> String {
    url.host_str().unwrap_or_default().to_string()
}
