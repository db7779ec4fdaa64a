use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use hubproxy::server::error::Error;
use hubproxy::server::services::AppServices;
use hubproxy::server::services::fetch_services::MockPageFetcherTrait;
use hubproxy::{AppConfig, ApplicationServer, SiteConfig};
use serde_json::Value;
use tower::ServiceExt;

const CATALOG_HTML: &str = include_str!("fixtures/catalog.html");

fn app(fetcher: MockPageFetcherTrait) -> Router {
    let services = AppServices::with_fetcher(
        Arc::new(AppConfig::default()),
        Arc::new(SiteConfig::new("https://4khdhub.test")),
        Arc::new(fetcher),
    );
    ApplicationServer::router(services)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_meta_and_stream_require_a_link() {
    for uri in [
        "/api/4khdhub/meta",
        "/api/4khdhub/stream?link=",
        "/api/4khdhub/meta?link=%20%20",
    ] {
        let (status, body) = get_json(app(MockPageFetcherTrait::new()), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "Link parameter is required");
    }
}

#[tokio::test]
async fn test_posts_returns_catalog_entries() {
    let mut fetcher = MockPageFetcherTrait::new();
    fetcher
        .expect_fetch_text()
        .withf(|url, _| url.to_string() == "https://4khdhub.test/page/1.html")
        .times(1)
        .returning(|_, _| Ok(CATALOG_HTML.to_string()));

    let (status, body) = get_json(app(fetcher), "/api/4khdhub/posts").await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "The Long Walk (2025)");
}

#[tokio::test]
async fn test_blank_page_falls_back_to_the_first_page() {
    let mut fetcher = MockPageFetcherTrait::new();
    fetcher
        .expect_fetch_text()
        .withf(|url, _| url.to_string() == "https://4khdhub.test/page/1.html")
        .times(1)
        .returning(|_, _| Ok(CATALOG_HTML.to_string()));

    let (status, body) = get_json(app(fetcher), "/api/4khdhub/posts?page=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_off_site_link_is_rejected() {
    let (status, body) = get_json(
        app(MockPageFetcherTrait::new()),
        "/api/4khdhub/meta?link=%40evil.test%2Fx.html",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("evil.test"));
}

#[tokio::test]
async fn test_posts_failure_is_reported_as_json() {
    let mut fetcher = MockPageFetcherTrait::new();
    fetcher
        .expect_fetch_text()
        .returning(|_, _| Err(Error::InternalServerErrorWithContext("upstream gone".to_string())));

    let (status, body) = get_json(app(fetcher), "/api/4khdhub/posts?page=2").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_health_reports_healthy() {
    let (status, body) = get_json(app(MockPageFetcherTrait::new()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["site_base_url"], "https://4khdhub.test");
}
