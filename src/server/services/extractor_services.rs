use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    config::SiteConfig,
    server::{
        dtos::catalog_dto::StreamSource,
        error::AppResult,
        services::fetch_services::DynPageFetcher,
        utils::{pattern_utils, scrape_utils},
    },
};

pub type DynStreamExtractor = Arc<dyn StreamExtractorTrait + Send + Sync>;

const AUTO_QUALITY: &str = "auto";

/// last hop, turns a file host page into something a player can open
#[automock]
#[async_trait]
pub trait StreamExtractorTrait {
    async fn extract(&self, link: &str) -> AppResult<Vec<StreamSource>>;
}

pub struct HubCloudExtractor {
    fetcher: DynPageFetcher,
    config: Arc<SiteConfig>,
}

impl HubCloudExtractor {
    pub fn new(fetcher: DynPageFetcher, config: Arc<SiteConfig>) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl StreamExtractorTrait for HubCloudExtractor {
    async fn extract(&self, link: &str) -> AppResult<Vec<StreamSource>> {
        info!("extracting sources from: {}", link);

        let html = self
            .fetcher
            .fetch_text(link, self.config.browser_headers())
            .await?;
        let page = scrape_utils::parse_hoster_page(&html);
        let page_quality = pattern_utils::extract_quality(&page.title);

        let sources: Vec<StreamSource> = page
            .candidates
            .into_iter()
            .map(|candidate| StreamSource {
                quality: pattern_utils::extract_quality(&candidate.label)
                    .or_else(|| page_quality.clone())
                    .unwrap_or_else(|| AUTO_QUALITY.to_string()),
                url: candidate.href,
            })
            .collect();

        // some hosts play the landing page directly, hand it back rather than nothing
        if sources.is_empty() {
            debug!("no download links on {}, passing it through", link);
            return Ok(vec![StreamSource {
                url: link.to_string(),
                quality: AUTO_QUALITY.to_string(),
            }]);
        }

        info!("found {} sources on {}", sources.len(), link);
        Ok(sources)
    }
}
