use std::sync::Arc;

use hubproxy::SiteConfig;
use hubproxy::server::error::Error;
use hubproxy::server::services::fetch_services::MockPageFetcherTrait;
use hubproxy::server::services::redirect_services::{RedirectResolver, RedirectResolverTrait};
use hubproxy::server::utils::cipher_utils::encode_layered;
use mockall::{Sequence, predicate};
use reqwest::header::HeaderMap;
use serde_json::json;

const START_LINK: &str = "https://links.example/r/abc";
const FOLLOW_UP: &str = "https://blog.example/safe?re=YWJjMTIz";

fn site_config(max_polls: u32) -> Arc<SiteConfig> {
    let mut config = SiteConfig::new("https://4khdhub.test");
    config.redirect_max_polls = max_polls;
    Arc::new(config)
}

/// the token split over two ck() calls like the real page does it
fn redirect_page() -> String {
    let token = encode_layered(&json!({
        "data": "abc123",
        "wp_http1": "https://blog.example/safe",
        "total_time": "5"
    }));
    let (head, tail) = token.split_at(10);
    format!(
        "<script>ck('_wp_http_1','{}');ck('_wp_http_2','{}');</script>",
        head, tail
    )
}

fn expect_page(
    fetcher: &mut MockPageFetcherTrait,
    seq: &mut Sequence,
    url: &'static str,
    body: String,
) {
    fetcher
        .expect_fetch_text()
        .with(predicate::eq(url), predicate::always())
        .times(1)
        .in_sequence(seq)
        .returning(move |_, _| Ok(body.clone()));
}

#[tokio::test]
async fn test_returns_follow_up_url_not_the_reurl_target() {
    let mut fetcher = MockPageFetcherTrait::new();
    let mut seq = Sequence::new();

    expect_page(&mut fetcher, &mut seq, START_LINK, redirect_page());
    expect_page(&mut fetcher, &mut seq, FOLLOW_UP, "Invalid Request".to_string());
    expect_page(
        &mut fetcher,
        &mut seq,
        FOLLOW_UP,
        r#"<script>var reurl = "https://hubcloud.test/drive/final";</script>"#.to_string(),
    );

    let resolver = RedirectResolver::new(Arc::new(fetcher), site_config(10));
    let resolved = resolver.resolve(START_LINK, &HeaderMap::new()).await;

    assert_eq!(resolved, FOLLOW_UP);
    assert_ne!(resolved, "https://hubcloud.test/drive/final");
}

#[tokio::test]
async fn test_ready_page_without_reurl_still_returns_follow_up() {
    let mut fetcher = MockPageFetcherTrait::new();
    let mut seq = Sequence::new();

    expect_page(&mut fetcher, &mut seq, START_LINK, redirect_page());
    expect_page(&mut fetcher, &mut seq, FOLLOW_UP, "<html>ready</html>".to_string());

    let resolver = RedirectResolver::new(Arc::new(fetcher), site_config(10));

    assert_eq!(
        resolver.resolve(START_LINK, &HeaderMap::new()).await,
        FOLLOW_UP
    );
}

#[tokio::test]
async fn test_falls_back_when_first_fetch_fails() {
    let mut fetcher = MockPageFetcherTrait::new();
    fetcher
        .expect_fetch_text()
        .times(1)
        .returning(|_, _| Err(Error::InternalServerErrorWithContext("boom".to_string())));

    let resolver = RedirectResolver::new(Arc::new(fetcher), site_config(10));

    assert_eq!(
        resolver.resolve(START_LINK, &HeaderMap::new()).await,
        START_LINK
    );
}

#[tokio::test]
async fn test_falls_back_when_token_is_missing_or_broken() {
    let mut fetcher = MockPageFetcherTrait::new();
    let mut seq = Sequence::new();

    expect_page(&mut fetcher, &mut seq, START_LINK, "<html></html>".to_string());
    expect_page(
        &mut fetcher,
        &mut seq,
        START_LINK,
        "ck('_wp_http_1','bm90IGxheWVyZWQ=')".to_string(),
    );

    let resolver = RedirectResolver::new(Arc::new(fetcher), site_config(10));

    assert_eq!(
        resolver.resolve(START_LINK, &HeaderMap::new()).await,
        START_LINK
    );
    assert_eq!(
        resolver.resolve(START_LINK, &HeaderMap::new()).await,
        START_LINK
    );
}

#[tokio::test]
async fn test_falls_back_when_payload_lacks_keys() {
    let token = encode_layered(&json!({ "data": "abc123" }));
    let mut fetcher = MockPageFetcherTrait::new();
    let mut seq = Sequence::new();

    expect_page(
        &mut fetcher,
        &mut seq,
        START_LINK,
        format!("ck('_wp_http_1','{}')", token),
    );

    let resolver = RedirectResolver::new(Arc::new(fetcher), site_config(10));

    assert_eq!(
        resolver.resolve(START_LINK, &HeaderMap::new()).await,
        START_LINK
    );
}

#[tokio::test]
async fn test_gives_up_after_poll_budget() {
    let mut fetcher = MockPageFetcherTrait::new();
    let mut seq = Sequence::new();

    expect_page(&mut fetcher, &mut seq, START_LINK, redirect_page());
    for _ in 0..3 {
        expect_page(&mut fetcher, &mut seq, FOLLOW_UP, "Invalid Request".to_string());
    }

    let resolver = RedirectResolver::new(Arc::new(fetcher), site_config(3));

    assert_eq!(
        resolver.resolve(START_LINK, &HeaderMap::new()).await,
        START_LINK
    );
}

#[tokio::test]
async fn test_polls_forward_the_callers_headers() {
    let mut headers = HeaderMap::new();
    headers.insert("referer", "https://4khdhub.test".parse().unwrap());

    let token_page = redirect_page();
    let mut fetcher = MockPageFetcherTrait::new();
    fetcher
        .expect_fetch_text()
        .withf(|_, headers| headers.get("referer").is_some())
        .times(2)
        .returning(move |url, _| {
            if url.contains("blog.example") {
                Ok("ready".to_string())
            } else {
                Ok(token_page.clone())
            }
        });

    let resolver = RedirectResolver::new(Arc::new(fetcher), site_config(10));

    assert_eq!(resolver.resolve(START_LINK, &headers).await, FOLLOW_UP);
}
