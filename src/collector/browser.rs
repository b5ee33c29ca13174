//! Browser collector: drives a real Chromium through the DevTools protocol,
//! so scripts run and the post-render cookie jar and web storage are
//! observable.
//!
//! The browser is launched lazily on the first site. A launch failure is an
//! ordinary `CollectError`, degrading every site to HTTP-only data instead
//! of aborting the run.

use crate::collector::chromium::find_chromium;
use crate::collector::{CollectError, Collector, CollectorKind, PartialResult};
use crate::record::{CookieRecord, CookieSource, SameSite, StorageItem, StorageKind};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{self, ClearBrowserCookiesParams};
use chromiumoxide::page::Page;
use chrono::DateTime;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

/// Tunables for the browser pass.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run Chromium without a visible window.
    pub headless: bool,
    /// How long to idle after load, letting deferred scripts write cookies
    /// and storage.
    pub settle_wait: Duration,
    pub navigation_timeout_ms: u64,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            settle_wait: Duration::from_secs(5),
            navigation_timeout_ms: 15_000,
        }
    }
}

/// Collects the rendered cookie jar and web storage from a Chromium page.
pub struct BrowserCollector {
    options: BrowserOptions,
    browser: OnceCell<Browser>,
}

impl BrowserCollector {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            options,
            browser: OnceCell::new(),
        }
    }

    async fn launch(&self) -> Result<Browser, CollectError> {
        let chrome_path = find_chromium().ok_or_else(|| {
            CollectError::collector(
                CollectorKind::Browser,
                "Chromium not found. Set CRUMB_CHROMIUM_PATH or install Chrome.",
            )
        })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--window-size=1920,1080");
        if self.options.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| CollectError::collector(CollectorKind::Browser, e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CollectError::collector(CollectorKind::Browser, e))?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        debug!("chromium launched (headless: {})", self.options.headless);
        Ok(browser)
    }

    async fn browser(&self) -> Result<&Browser, CollectError> {
        self.browser.get_or_try_init(|| self.launch()).await
    }
}

#[async_trait]
impl Collector for BrowserCollector {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Browser
    }

    async fn collect(&self, url: &Url) -> Result<PartialResult, CollectError> {
        let browser = self.browser().await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CollectError::collector(CollectorKind::Browser, e))?;

        let result = self.collect_on_page(&page, url).await;

        if let Err(e) = page.close().await {
            warn!("failed to close page for {url}: {e}");
        }

        result
    }
}

impl BrowserCollector {
    async fn collect_on_page(
        &self,
        page: &Page,
        url: &Url,
    ) -> Result<PartialResult, CollectError> {
        // Fresh jar per site so one site's cookies never bleed into the next.
        page.execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| CollectError::collector(CollectorKind::Browser, e))?;

        let navigation = tokio::time::timeout(
            Duration::from_millis(self.options.navigation_timeout_ms),
            page.goto(url.as_str()),
        )
        .await;

        match navigation {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(CollectError::collector(
                    CollectorKind::Browser,
                    format!("navigation failed: {e}"),
                ));
            }
            Err(_) => {
                return Err(CollectError::collector(
                    CollectorKind::Browser,
                    format!(
                        "navigation timed out after {}ms",
                        self.options.navigation_timeout_ms
                    ),
                ));
            }
        }

        let _ = page.wait_for_navigation().await;
        tokio::time::sleep(self.options.settle_wait).await;

        let domain = url.host_str().unwrap_or_default().to_string();

        let jar = page
            .get_cookies()
            .await
            .map_err(|e| CollectError::collector(CollectorKind::Browser, e))?;
        let cookies: Vec<CookieRecord> = jar
            .into_iter()
            .map(|c| {
                map_jar_cookie(
                    c.name,
                    c.value,
                    &c.domain,
                    c.path,
                    c.expires,
                    c.session,
                    c.secure,
                    c.http_only,
                    c.same_site,
                )
            })
            .collect();

        let mut storage_items = Vec::new();
        for kind in [StorageKind::Local, StorageKind::Session] {
            for (key, value) in read_storage(page, kind).await {
                storage_items.push(StorageItem {
                    kind,
                    key,
                    value,
                    domain: domain.clone(),
                });
            }
        }

        debug!(
            "browser pass on {domain}: {} cookies, {} storage items",
            cookies.len(),
            storage_items.len()
        );

        Ok(PartialResult {
            cookies,
            storage_items,
        })
    }
}

/// Map a DevTools jar cookie into a record. A session cookie (or a
/// non-positive expiry timestamp, which Chromium uses for the same thing)
/// becomes `expires: None`.
#[allow(clippy::too_many_arguments)]
fn map_jar_cookie(
    name: String,
    value: String,
    domain: &str,
    path: String,
    expires_ts: f64,
    session: bool,
    secure: bool,
    http_only: bool,
    same_site: Option<network::CookieSameSite>,
) -> CookieRecord {
    let expires = if session || expires_ts <= 0.0 {
        None
    } else {
        DateTime::from_timestamp(expires_ts as i64, 0)
    };

    let same_site = match same_site {
        Some(network::CookieSameSite::Strict) => SameSite::Strict,
        Some(network::CookieSameSite::Lax) => SameSite::Lax,
        Some(network::CookieSameSite::None) => SameSite::None,
        Option::None => SameSite::Unspecified,
    };

    CookieRecord {
        name,
        value,
        domain: domain.trim_start_matches('.').to_lowercase(),
        path,
        expires,
        secure,
        http_only,
        same_site,
        source: CookieSource::Browser,
    }
}

/// Snapshot one storage area as a sorted key/value map. A read failure
/// (sandboxed page, storage access denied) logs and yields nothing.
async fn read_storage(page: &Page, kind: StorageKind) -> BTreeMap<String, String> {
    let area = match kind {
        StorageKind::Local => "localStorage",
        StorageKind::Session => "sessionStorage",
    };
    let script = format!(
        "(() => {{ const items = {{}}; \
           for (let i = 0; i < {area}.length; i++) {{ \
             const k = {area}.key(i); items[k] = {area}.getItem(k); \
           }} return items; }})()"
    );

    match page.evaluate(script).await {
        Ok(result) => match result.into_value::<BTreeMap<String, String>>() {
            Ok(items) => items,
            Err(e) => {
                warn!("failed to decode {area} snapshot: {e:?}");
                BTreeMap::new()
            }
        },
        Err(e) => {
            warn!("failed to read {area}: {e}");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jar_session_cookie_has_no_expiry() {
        let record = map_jar_cookie(
            "sid".to_string(),
            "v".to_string(),
            ".example.com",
            "/".to_string(),
            -1.0,
            true,
            true,
            true,
            Some(network::CookieSameSite::Lax),
        );

        assert!(record.expires.is_none());
        assert_eq!(record.domain, "example.com");
        assert_eq!(record.same_site, SameSite::Lax);
        assert_eq!(record.source, CookieSource::Browser);
        assert!(record.secure);
        assert!(record.http_only);
    }

    #[test]
    fn test_jar_persistent_cookie_expiry() {
        let record = map_jar_cookie(
            "p".to_string(),
            "1".to_string(),
            "example.com",
            "/app".to_string(),
            1924992000.0,
            false,
            false,
            false,
            None,
        );

        assert_eq!(record.expires.unwrap().timestamp(), 1924992000);
        assert_eq!(record.path, "/app");
        assert_eq!(record.same_site, SameSite::Unspecified);
    }

    // Requires a local Chromium; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_browser_collects_from_live_page() {
        let collector = BrowserCollector::new(BrowserOptions {
            settle_wait: Duration::from_millis(500),
            ..BrowserOptions::default()
        });
        let url = Url::parse("https://example.com").unwrap();
        let result = collector.collect(&url).await.unwrap();
        for cookie in &result.cookies {
            assert_eq!(cookie.source, CookieSource::Browser);
        }
    }
}
