//! HTTP collector: one request/response cycle per site, reading whatever
//! cookies the server sets via `Set-Cookie` response headers.
//!
//! Not a browser: no scripts run, so this pass can never observe
//! `localStorage`/`sessionStorage` or script-written cookies.

use crate::collector::{CollectError, Collector, CollectorKind, PartialResult};
use crate::record::{CookieRecord, CookieSource, SameSite};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Collects server-set cookies from a single HTTP response.
pub struct HttpCollector {
    client: reqwest::Client,
}

impl HttpCollector {
    /// Create an HTTP collector with the given request timeout.
    pub fn new(timeout_ms: u64) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/131.0.0.0 Safari/537.36";

        // Single-hop redirects only: this pass records what the seed URL
        // itself sets, it does not chase the redirect chain.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(1))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

#[async_trait]
impl Collector for HttpCollector {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Http
    }

    async fn collect(&self, url: &Url) -> Result<PartialResult, CollectError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| CollectError::collector(CollectorKind::Http, e))?;

        let status = response.status().as_u16();
        let host = url.host_str().unwrap_or_default().to_string();
        let now = Utc::now();

        let mut cookies = Vec::new();
        for value in response.headers().get_all(reqwest::header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                warn!("skipping non-ASCII Set-Cookie header from {host}");
                continue;
            };
            match parse_set_cookie(raw, &host, now) {
                Some(cookie) => cookies.push(cookie),
                None => warn!("failed to parse Set-Cookie header from {host}: {raw}"),
            }
        }

        debug!(
            "http pass on {host}: status {status}, {} cookies",
            cookies.len()
        );

        Ok(PartialResult {
            cookies,
            storage_items: Vec::new(),
        })
    }
}

/// Parse one `Set-Cookie` header value into a cookie record.
///
/// `Max-Age` takes precedence over `Expires` (RFC 6265 §5.3); a missing
/// `Domain` attribute defaults to the request host; a missing `Path`
/// defaults to `/`. Returns `None` on an unparseable header.
pub(crate) fn parse_set_cookie(
    raw: &str,
    request_host: &str,
    collected_at: DateTime<Utc>,
) -> Option<CookieRecord> {
    let parsed = cookie::Cookie::parse(raw).ok()?;

    let domain = parsed
        .domain()
        .map(|d| d.trim_start_matches('.').to_lowercase())
        .unwrap_or_else(|| request_host.to_lowercase());

    let expires = if let Some(max_age) = parsed.max_age() {
        // Servers send arbitrarily large Max-Age values; saturate instead
        // of overflowing the timestamp range.
        let secs = max_age.whole_seconds();
        let at = ChronoDuration::try_seconds(secs)
            .and_then(|d| collected_at.checked_add_signed(d))
            .unwrap_or(if secs >= 0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                DateTime::<Utc>::MIN_UTC
            });
        Some(at)
    } else {
        parsed
            .expires()
            .and_then(|e| e.datetime())
            .and_then(|odt| DateTime::from_timestamp(odt.unix_timestamp(), 0))
    };

    let same_site = match parsed.same_site() {
        Some(cookie::SameSite::None) => SameSite::None,
        Some(cookie::SameSite::Lax) => SameSite::Lax,
        Some(cookie::SameSite::Strict) => SameSite::Strict,
        None => SameSite::Unspecified,
    };

    Some(CookieRecord {
        name: parsed.name().to_string(),
        value: parsed.value().to_string(),
        domain,
        path: parsed.path().unwrap_or("/").to_string(),
        expires,
        secure: parsed.secure().unwrap_or(false),
        http_only: parsed.http_only().unwrap_or(false),
        same_site,
        source: CookieSource::Http,
    })
}
