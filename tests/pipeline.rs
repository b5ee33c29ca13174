//! End-to-end pipeline tests against a local mock HTTP server: collect,
//! persist, reload, aggregate.

use crumb::collector::http::HttpCollector;
use crumb::collector::{Collector, CollectorKind};
use crumb::orchestrator::Orchestrator;
use crumb::record::{CookieSource, SameSite};
use crumb::{export, stats, store};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_cookie_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "sid=abc123; Path=/; HttpOnly")
                .append_header(
                    "set-cookie",
                    "theme=dark; Max-Age=2592000; Secure; SameSite=Lax",
                ),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_http_collector_reads_set_cookie_headers() {
    let server = start_cookie_server().await;
    let url = Url::parse(&server.uri()).unwrap();

    let collector = HttpCollector::new(5_000);
    assert_eq!(collector.kind(), CollectorKind::Http);

    let result = collector.collect(&url).await.unwrap();
    assert_eq!(result.cookies.len(), 2);
    assert!(result.storage_items.is_empty());

    let sid = &result.cookies[0];
    assert_eq!(sid.name, "sid");
    assert_eq!(sid.domain, "127.0.0.1");
    assert!(sid.http_only);
    assert!(sid.is_session());
    assert_eq!(sid.source, CookieSource::Http);

    let theme = &result.cookies[1];
    assert_eq!(theme.name, "theme");
    assert!(theme.secure);
    assert_eq!(theme.same_site, SameSite::Lax);
    assert!(theme.expires.is_some());
}

#[tokio::test]
async fn test_collect_persist_reload_and_aggregate() {
    let server = start_cookie_server().await;
    let snapshot_dir = tempfile::tempdir().unwrap();

    let orchestrator = Orchestrator::new(vec![Box::new(HttpCollector::new(5_000))]);
    let records = orchestrator
        .run(&[server.uri(), "not a url ://".to_string()])
        .await;
    assert_eq!(records.len(), 2);
    assert!(records[0].collector_errors.is_empty());
    assert_eq!(records[1].collector_errors.len(), 1);

    for record in &records {
        store::save_record(snapshot_dir.path(), record).unwrap();
    }

    let loaded = store::load_records(snapshot_dir.path()).unwrap();
    assert_eq!(loaded.len(), 2);

    let snapshot = stats::compute(&loaded, 10);
    assert_eq!(snapshot.total_domains, 2);
    assert_eq!(snapshot.total_cookies, 2);
    assert_eq!(snapshot.secure_cookies.count, 1);
    assert_eq!(snapshot.http_only_cookies.count, 1);
    assert_eq!(snapshot.session_cookies.count, 1);
    assert_eq!(snapshot.persistent_cookies.count, 1);
    assert_eq!(snapshot.same_site.lax.count, 1);
    assert_eq!(snapshot.age_categories.short_term, 1);
    assert!(snapshot
        .top_cookie_names
        .iter()
        .any(|(name, count)| name == "sid" && *count == 1));

    let report = stats::report::render(&snapshot);
    assert!(report.contains("Total cookies found: 2"));
    assert!(report.contains("127.0.0.1"));

    let csv_path = snapshot_dir.path().join("export.csv");
    let (cookie_rows, storage_rows) = export::export_csv(&loaded, &csv_path).unwrap();
    assert_eq!(cookie_rows, 2);
    assert_eq!(storage_rows, 0);
}

#[tokio::test]
async fn test_unreachable_site_degrades_to_failure_note() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server); // port is now closed

    let orchestrator = Orchestrator::new(vec![Box::new(HttpCollector::new(2_000))]);
    let records = orchestrator.run(&[uri]).await;
    assert_eq!(records.len(), 1);
    assert!(records[0].cookies.is_empty());
    assert_eq!(records[0].collector_errors.len(), 1);
    assert!(records[0].collector_errors[0]
        .message
        .contains("http collector failed"));
}
