use std::sync::atomic::Ordering;

use serde_json::json;

use super::*;
use crate::extract::Category;
use crate::testing::{FakeDriver, FakeNavigation, FakePage};

fn crawler(page: FakePage) -> Crawler<FakeDriver> {
    Crawler::with_driver(FakeDriver::new(page), &Config::default())
}

#[tokio::test(start_paused = true)]
async fn test_timeout_returns_error_and_closes_page() {
    let crawler = crawler(FakePage::new().navigation(FakeNavigation::Hangs));

    let err = crawler
        .crawl("https://slow.example.test/")
        .await
        .unwrap_err();

    match err {
        NavigationError::Timeout { url, after } => {
            assert_eq!(url, "https://slow.example.test/");
            assert_eq!(after, Duration::from_secs(30));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    let counters = crawler.driver().counters();
    assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
    assert_eq!(counters.open_pages(), 0);
    assert_eq!(counters.evaluations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_http_error_status_is_fatal() {
    let crawler = crawler(FakePage::new().navigation(FakeNavigation::Loaded(Some(404))));

    let err = crawler.crawl("https://example.test/missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(crawler.driver().counters().open_pages(), 0);
}

#[tokio::test]
async fn test_missing_status_counts_as_success() {
    let crawler = crawler(FakePage::new().navigation(FakeNavigation::Loaded(None)));
    let doc = crawler.crawl("data:text/html,<p>hi</p>").await.unwrap();
    assert_eq!(doc.url, "data:text/html,<p>hi</p>");
}

#[tokio::test]
async fn test_browser_navigation_failure() {
    let crawler = crawler(
        FakePage::new().navigation(FakeNavigation::Fails("net::ERR_NAME_NOT_RESOLVED".into())),
    );

    let err = crawler.crawl("https://nope.invalid/").await.unwrap_err();
    match err {
        NavigationError::Failed { url, reason } => {
            assert_eq!(url, "https://nope.invalid/");
            assert!(reason.contains("ERR_NAME_NOT_RESOLVED"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(crawler.driver().counters().open_pages(), 0);
}

#[tokio::test]
async fn test_unreachable_browser() {
    let crawler = Crawler::with_driver(FakeDriver::unreachable("refused"), &Config::default());
    let err = crawler.crawl("https://example.test/").await.unwrap_err();
    assert!(matches!(
        err,
        NavigationError::Browser(BrowserError::ConnectionFailed(_))
    ));
}

#[tokio::test]
async fn test_crawl_closes_page_after_extraction() {
    let crawler = crawler(FakePage::new().with(
        Category::Metadata,
        json!({"title": "Home", "lang": "en"}),
    ));

    let doc = crawler.crawl("https://example.test/").await.unwrap();
    assert_eq!(doc.page_metadata.title.as_deref(), Some("Home"));
    assert!(doc.extraction_metadata.warnings.is_empty());

    let counters = crawler.driver().counters();
    assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
    assert_eq!(counters.open_pages(), 0);
}

#[tokio::test]
async fn test_sequential_crawls_reuse_driver() {
    let crawler = crawler(FakePage::new());
    for _ in 0..3 {
        crawler.crawl("https://example.test/").await.unwrap();
    }
    let counters = crawler.driver().counters();
    assert_eq!(counters.opened.load(Ordering::SeqCst), 3);
    assert_eq!(counters.open_pages(), 0);
    assert_eq!(crawler.driver().shutdowns.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_with_session_exposes_loaded_page() {
    let crawler = crawler(FakePage::new());
    let (url, status) = crawler
        .with_session("https://example.test/", |page| {
            Box::pin(async move { (page.url().to_string(), page.outcome().status) })
        })
        .await
        .unwrap();
    assert_eq!(url, "https://example.test/");
    assert_eq!(status, Some(200));
    assert_eq!(crawler.driver().counters().open_pages(), 0);
}

#[tokio::test]
async fn test_dropped_page_is_closed_in_background() {
    let crawler = crawler(FakePage::new());
    let page = crawler.open_session("https://example.test/").await.unwrap();
    assert_eq!(crawler.driver().counters().open_pages(), 1);

    drop(page);
    tokio::task::yield_now().await;
    assert_eq!(crawler.driver().counters().open_pages(), 0);
}

#[tokio::test]
async fn test_shutdown_reaches_driver() {
    let crawler = crawler(FakePage::new());
    crawler.shutdown().await;
    assert_eq!(crawler.driver().shutdowns.load(Ordering::SeqCst), 1);
}
