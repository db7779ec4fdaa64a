pub mod app_services;
pub mod catalog_services;
pub mod extractor_services;
pub mod fetch_services;
pub mod redirect_services;
pub mod stream_services;

pub use app_services::AppServices;
pub use catalog_services::DynCatalogService;
pub use extractor_services::DynStreamExtractor;
pub use fetch_services::DynPageFetcher;
pub use redirect_services::DynRedirectResolver;
pub use stream_services::DynStreamService;
