use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::HeaderMap;
use tracing::{debug, error};

use crate::{config::SiteConfig, server::error::AppResult};

pub type DynPageFetcher = Arc<dyn PageFetcherTrait + Send + Sync>;

/// every outbound GET goes through here so the pipelines can be tested against canned pages
#[automock]
#[async_trait]
pub trait PageFetcherTrait {
    /// GET `url` and return the body, anything that isn't 2xx is an error
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> AppResult<String>;
}

pub struct HttpPageFetcher {
    http_client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(config: &SiteConfig) -> Self {
        // no default user agent on purpose, the catalog listing is fetched bare and the browser
        // headers are added per request
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|e| {
                error!("failed to build http client, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self { http_client }
    }
}

#[async_trait]
impl PageFetcherTrait for HttpPageFetcher {
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> AppResult<String> {
        debug!("GET {} ({} headers)", url, headers.len());

        let response = self
            .http_client
            .get(url)
            .headers(headers.clone())
            .send()
            .await?
            .error_for_status()?;

        debug!("{} answered {}", url, response.status());

        Ok(response.text().await?)
    }
}
