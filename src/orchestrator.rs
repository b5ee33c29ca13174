//! Run orchestrator: walks the site list, runs every collector against each
//! site, merges what they saw, and records failures as per-site notes.
//!
//! One site's failure never touches another site. Even a site where every
//! stage failed still yields a record, so the run ledger is always the same
//! length as the input list.

use crate::collector::{CollectError, Collector};
use crate::record::merge;
use crate::record::{CollectionRecord, CollectorFailure, FailureStage};
use crate::target;
use chrono::Utc;
use tracing::{info, warn};

/// Drives the collectors over a site list, in order.
pub struct Orchestrator {
    collectors: Vec<Box<dyn Collector>>,
}

impl Orchestrator {
    pub fn new(collectors: Vec<Box<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// Process every site sequentially and return one record per site, in
    /// input order.
    pub async fn run(&self, sites: &[String]) -> Vec<CollectionRecord> {
        let mut records = Vec::with_capacity(sites.len());
        for (i, site) in sites.iter().enumerate() {
            info!("[{}/{}] collecting {site}", i + 1, sites.len());
            let record = self.collect_site(site).await;
            if record.collector_errors.is_empty() {
                info!(
                    "{}: {} cookies, {} storage items",
                    record.domain,
                    record.cookies.len(),
                    record.storage_items.len()
                );
            } else {
                warn!(
                    "{}: {} cookies, {} storage items, {} failure(s)",
                    record.domain,
                    record.cookies.len(),
                    record.storage_items.len(),
                    record.collector_errors.len()
                );
            }
            records.push(record);
        }
        records
    }

    async fn collect_site(&self, raw: &str) -> CollectionRecord {
        let collected_at = Utc::now();

        let url = match target::resolve(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!("skipping `{raw}`: {e}");
                let mut record =
                    CollectionRecord::new(raw.trim().to_string(), raw.trim().to_string(), collected_at);
                record.collector_errors.push(CollectorFailure {
                    collector: FailureStage::Resolve,
                    message: e.to_string(),
                });
                return record;
            }
        };

        let mut record = CollectionRecord::new(
            target::canonical_domain(&url),
            url.to_string(),
            collected_at,
        );

        for collector in &self.collectors {
            match collector.collect(&url).await {
                Ok(partial) => {
                    record.cookies =
                        merge::overlay_cookies(record.cookies, partial.cookies);
                    record.storage_items.extend(partial.storage_items);
                }
                Err(e) => {
                    warn!("{} pass on {} failed: {e}", collector.kind(), record.domain);
                    let stage = match &e {
                        CollectError::InvalidTarget(_) => FailureStage::Resolve,
                        CollectError::Collector { .. } => collector.kind().stage(),
                    };
                    record.collector_errors.push(CollectorFailure {
                        collector: stage,
                        message: e.to_string(),
                    });
                }
            }
        }

        record.storage_items = merge::dedupe_storage(std::mem::take(&mut record.storage_items));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{CollectorKind, PartialResult};
    use crate::record::{CookieRecord, CookieSource, SameSite, StorageItem, StorageKind};
    use async_trait::async_trait;
    use url::Url;

    struct StubCollector {
        kind: CollectorKind,
        outcome: Result<(Vec<CookieRecord>, Vec<StorageItem>), String>,
    }

    #[async_trait]
    impl Collector for StubCollector {
        fn kind(&self) -> CollectorKind {
            self.kind
        }

        async fn collect(&self, _url: &Url) -> Result<PartialResult, CollectError> {
            match &self.outcome {
                Ok((cookies, storage_items)) => Ok(PartialResult {
                    cookies: cookies.clone(),
                    storage_items: storage_items.clone(),
                }),
                Err(msg) => Err(CollectError::collector(self.kind, msg)),
            }
        }
    }

    fn cookie(name: &str, value: &str, source: CookieSource) -> CookieRecord {
        CookieRecord {
            name: name.to_string(),
            value: value.to_string(),
            domain: "example.com".to_string(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::Unspecified,
            source,
        }
    }

    #[tokio::test]
    async fn test_collectors_merge_in_order() {
        let orchestrator = Orchestrator::new(vec![
            Box::new(StubCollector {
                kind: CollectorKind::Http,
                outcome: Ok((
                    vec![
                        cookie("sid", "from-header", CookieSource::Http),
                        cookie("legacy", "http-only", CookieSource::Http),
                    ],
                    vec![],
                )),
            }),
            Box::new(StubCollector {
                kind: CollectorKind::Browser,
                outcome: Ok((
                    vec![cookie("sid", "from-jar", CookieSource::Browser)],
                    vec![StorageItem {
                        kind: StorageKind::Local,
                        key: "theme".to_string(),
                        value: "dark".to_string(),
                        domain: "example.com".to_string(),
                    }],
                )),
            }),
        ]);

        let records = orchestrator.run(&["example.com".to_string()]).await;
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.domain, "example.com");
        assert_eq!(record.url, "https://example.com/");
        assert!(record.collector_errors.is_empty());

        assert_eq!(record.cookies.len(), 2);
        assert_eq!(record.cookies[0].name, "sid");
        assert_eq!(record.cookies[0].value, "from-jar");
        assert_eq!(record.cookies[0].source, CookieSource::Both);
        assert_eq!(record.cookies[1].name, "legacy");

        assert_eq!(record.storage_items.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_collector_degrades_not_aborts() {
        let orchestrator = Orchestrator::new(vec![
            Box::new(StubCollector {
                kind: CollectorKind::Http,
                outcome: Ok((vec![cookie("sid", "v", CookieSource::Http)], vec![])),
            }),
            Box::new(StubCollector {
                kind: CollectorKind::Browser,
                outcome: Err("launch failed".to_string()),
            }),
        ]);

        let records = orchestrator.run(&["example.com".to_string()]).await;
        let record = &records[0];

        assert_eq!(record.cookies.len(), 1);
        assert_eq!(record.collector_errors.len(), 1);
        assert_eq!(record.collector_errors[0].collector, FailureStage::Browser);
        assert!(record.collector_errors[0].message.contains("launch failed"));
    }

    #[tokio::test]
    async fn test_invalid_target_still_emits_record() {
        let orchestrator = Orchestrator::new(vec![Box::new(StubCollector {
            kind: CollectorKind::Http,
            outcome: Ok((vec![], vec![])),
        })]);

        let records = orchestrator
            .run(&["ftp://bad".to_string(), "example.com".to_string()])
            .await;
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].collector_errors.len(), 1);
        assert_eq!(
            records[0].collector_errors[0].collector,
            FailureStage::Resolve
        );
        assert!(records[0].cookies.is_empty());

        assert!(records[1].collector_errors.is_empty());
    }

    #[tokio::test]
    async fn test_all_collectors_failing_yields_empty_record() {
        let orchestrator = Orchestrator::new(vec![
            Box::new(StubCollector {
                kind: CollectorKind::Http,
                outcome: Err("connection refused".to_string()),
            }),
            Box::new(StubCollector {
                kind: CollectorKind::Browser,
                outcome: Err("no chromium".to_string()),
            }),
        ]);

        let records = orchestrator.run(&["example.com".to_string()]).await;
        let record = &records[0];
        assert!(record.cookies.is_empty());
        assert!(record.storage_items.is_empty());
        assert_eq!(record.collector_errors.len(), 2);
        assert_eq!(record.collector_errors[0].collector, FailureStage::Http);
        assert_eq!(record.collector_errors[1].collector, FailureStage::Browser);
    }
}
