use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::HeaderMap;
use tracing::{info, warn};

use crate::{
    config::SiteConfig,
    server::{
        dtos::catalog_dto::{CatalogEntry, DetailRecord},
        error::{AppResult, Error},
        services::fetch_services::DynPageFetcher,
        utils::scrape_utils,
    },
};

pub type DynCatalogService = Arc<dyn CatalogServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait CatalogServiceTrait {
    async fn list_catalog(
        &self,
        filter: &str,
        page: &str,
        search_query: &str,
    ) -> AppResult<Vec<CatalogEntry>>;
    async fn get_detail(&self, link: &str) -> AppResult<DetailRecord>;
}

pub struct CatalogService {
    fetcher: DynPageFetcher,
    config: Arc<SiteConfig>,
}

impl CatalogService {
    pub fn new(fetcher: DynPageFetcher, config: Arc<SiteConfig>) -> Self {
        Self { fetcher, config }
    }

    /// search results and filtered listings paginate differently
    pub fn listing_url(&self, filter: &str, page: &str, search_query: &str) -> AppResult<String> {
        let path = if search_query.is_empty() {
            format!("{}/page/{}.html", filter, page)
        } else {
            format!("/page/{}.html?s={}", page, urlencoding::encode(search_query))
        };

        self.on_site(&path)
    }

    fn on_site(&self, path: &str) -> AppResult<String> {
        self.config.site_url(path).ok_or_else(|| {
            warn!("refusing to fetch {} outside of {}", path, self.config.base_url);
            Error::BadRequest(format!("'{}' is not a page on {}", path, self.config.base_url))
        })
    }
}

#[async_trait]
impl CatalogServiceTrait for CatalogService {
    async fn list_catalog(
        &self,
        filter: &str,
        page: &str,
        search_query: &str,
    ) -> AppResult<Vec<CatalogEntry>> {
        let url = self.listing_url(filter, page, search_query)?;
        info!("fetching 4khdhub posts from: {}", url);

        // listings have always been fetched without the browser headers and the site is fine
        // with it, left alone until that stops being true
        let html = self.fetcher.fetch_text(&url, &HeaderMap::new()).await?;
        let entries = scrape_utils::parse_catalog(&html);

        info!("scraped {} posts from {}", entries.len(), url);
        Ok(entries)
    }

    async fn get_detail(&self, link: &str) -> AppResult<DetailRecord> {
        let url = self.on_site(link)?;
        info!("fetching 4khdhub meta from: {}", url);

        let html = self.fetcher.fetch_text(&url, &HeaderMap::new()).await?;
        let detail = scrape_utils::parse_detail(&html);

        info!(
            "scraped {:?} '{}' with {} link groups",
            detail.media_type,
            detail.title,
            detail.link_groups.len()
        );
        Ok(detail)
    }
}
