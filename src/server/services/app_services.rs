use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, SiteConfig};

use super::{
    catalog_services::{CatalogService, DynCatalogService},
    extractor_services::{DynStreamExtractor, HubCloudExtractor},
    fetch_services::{DynPageFetcher, HttpPageFetcher},
    redirect_services::{DynRedirectResolver, RedirectResolver},
    stream_services::{DynStreamService, StreamService},
};

/// everything the controllers need, cloned into each request through an Extension
#[derive(Clone)]
pub struct AppServices {
    pub catalog: DynCatalogService,
    pub streams: DynStreamService,
    pub site: Arc<SiteConfig>,
    pub config: Arc<AppConfig>,
}

impl AppServices {
    pub fn new(config: Arc<AppConfig>) -> Self {
        info!("starting scraping services...");

        let site = Arc::new(SiteConfig::from(config.as_ref()));
        let fetcher = Arc::new(HttpPageFetcher::new(&site)) as DynPageFetcher;

        info!("http client ok, target site is {}", site.base_url);

        Self::with_fetcher(config, site, fetcher)
    }

    /// same wiring as [`AppServices::new`] but over any fetcher, tests hand in a mock here
    pub fn with_fetcher(
        config: Arc<AppConfig>,
        site: Arc<SiteConfig>,
        fetcher: DynPageFetcher,
    ) -> Self {
        let redirects = Arc::new(RedirectResolver::new(fetcher.clone(), site.clone()))
            as DynRedirectResolver;
        let extractor = Arc::new(HubCloudExtractor::new(fetcher.clone(), site.clone()))
            as DynStreamExtractor;

        let catalog =
            Arc::new(CatalogService::new(fetcher.clone(), site.clone())) as DynCatalogService;
        let streams = Arc::new(StreamService::new(
            fetcher,
            redirects,
            extractor,
            site.clone(),
        )) as DynStreamService;

        Self {
            catalog,
            streams,
            site,
            config,
        }
    }
}
