// download link -> playable url. Roughly:
//   hubdrive page -> green button
//   or: catalog link -> s('o', ...) payload -> redirect page -> hubcloud drive link -> button
// then whatever that lands on may meta refresh once more before the extractor takes over.
//
// unlike the redirect resolver every failure here is the caller's problem
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::HeaderMap;
use tracing::{debug, error, info};

use crate::{
    config::SiteConfig,
    server::{
        dtos::catalog_dto::StreamSource,
        error::{AppResult, Error},
        services::{
            extractor_services::DynStreamExtractor, fetch_services::DynPageFetcher,
            redirect_services::DynRedirectResolver,
        },
        utils::{cipher_utils, pattern_utils, scrape_utils},
    },
};

pub type DynStreamService = Arc<dyn StreamServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait StreamServiceTrait {
    async fn resolve_stream(&self, link: &str) -> AppResult<Vec<StreamSource>>;
}

pub struct StreamService {
    fetcher: DynPageFetcher,
    redirects: DynRedirectResolver,
    extractor: DynStreamExtractor,
    config: Arc<SiteConfig>,
}

impl StreamService {
    pub fn new(
        fetcher: DynPageFetcher,
        redirects: DynRedirectResolver,
        extractor: DynStreamExtractor,
        config: Arc<SiteConfig>,
    ) -> Self {
        Self {
            fetcher,
            redirects,
            extractor,
            config,
        }
    }

    async fn follow_drive_button(&self, link: &str, headers: &HeaderMap) -> AppResult<String> {
        let html = self.fetcher.fetch_text(link, headers).await?;

        match scrape_utils::extract_drive_button(&html) {
            Some(href) => {
                debug!("drive button on {} points at {}", link, href);
                Ok(href)
            }
            None => {
                debug!("no drive button on {}, keeping it", link);
                Ok(link.to_string())
            }
        }
    }

    /// pulls the `o` link out of the obfuscated catalog page
    async fn decode_intermediate_link(&self, link: &str, headers: &HeaderMap) -> AppResult<String> {
        let body = self.fetcher.fetch_text(link, headers).await?;

        let encrypted = pattern_utils::extract_encrypted_o(&body).ok_or_else(|| {
            error!("no s('o', ...) payload on {}", link);
            Error::InternalServerErrorWithContext("Encrypted string not found".to_string())
        })?;

        let payload = cipher_utils::decode_layered(&encrypted);
        let encoded_link = payload
            .as_ref()
            .and_then(|payload| payload.get_str("o"))
            .ok_or_else(|| {
                Error::InternalServerErrorWithContext(
                    "Failed to decode encrypted string or missing 'o' key".to_string(),
                )
            })?;

        cipher_utils::decode_simple(encoded_link).map_err(|e| {
            error!("'o' value on {} isn't base64: {}", link, e);
            Error::InternalServerErrorWithContext(format!(
                "Failed to decode intermediate link: {}",
                e
            ))
        })
    }

    async fn walk_encrypted_link(&self, link: &str, headers: &HeaderMap) -> AppResult<String> {
        let intermediate = self.decode_intermediate_link(link, headers).await?;
        debug!("intermediate link: {}", intermediate);

        let resolved = self.redirects.resolve(&intermediate, headers).await;
        let body = self.fetcher.fetch_text(&resolved, headers).await?;

        let drive_link = pattern_utils::extract_hubcloud_drive_href(&body)
            .or_else(|| scrape_utils::extract_quality_anchor(&body))
            .unwrap_or_else(|| {
                debug!("no hubcloud link on {}, falling back to {}", resolved, intermediate);
                intermediate.clone()
            });

        if pattern_utils::is_drive_link(&drive_link) {
            return self.follow_drive_button(&drive_link, headers).await;
        }

        Ok(drive_link)
    }

    async fn follow_meta_refresh(&self, link: &str, headers: &HeaderMap) -> AppResult<String> {
        let body = self.fetcher.fetch_text(link, headers).await?;

        Ok(pattern_utils::extract_meta_refresh(&body).unwrap_or_else(|| link.to_string()))
    }
}

#[async_trait]
impl StreamServiceTrait for StreamService {
    async fn resolve_stream(&self, link: &str) -> AppResult<Vec<StreamSource>> {
        info!("fetching 4khdhub stream from: {}", link);
        let headers = self.config.browser_headers();

        let drive_link = if pattern_utils::is_drive_link(link) {
            self.follow_drive_button(link, headers).await?
        } else {
            self.walk_encrypted_link(link, headers).await?
        };

        let terminal_link = self.follow_meta_refresh(&drive_link, headers).await?;
        info!("terminal link for {}: {}", link, terminal_link);

        self.extractor.extract(&terminal_link).await
    }
}
