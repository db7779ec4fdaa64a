use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

pub const DEFAULT_SITE_BASE_URL: &str = "https://4khdhub.net";

// the site fingerprints old chrome builds less than new ones, don't bump this without checking
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser, Debug, Clone)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum)]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    // this should be either * for allowing everything, or a comma seperated list of origins like
    // https://example.com,https://something.com
    #[clap(long, env, default_value = "*")]
    pub cors_origin: String,

    // the catalog moves domains every few months, swap it here instead of in code
    #[clap(long, env, default_value = DEFAULT_SITE_BASE_URL)]
    pub site_base_url: String,

    // applies to every outbound request, the redirect polling loop has no other timeout
    #[clap(long, env, default_value = "30")]
    pub request_timeout_secs: u64,

    // how many times the follow-up link is polled while it still says "Invalid Request"
    #[clap(long, env, default_value = "10")]
    pub redirect_max_polls: u32,

    // the site's own player sleeps for total_time + 3 seconds before polling, off by default
    // because it holds the request open that long
    #[clap(long, env)]
    pub redirect_wait_for_total_time: bool,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl Default for AppConfig {
    // mostly here for tests
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 5000,
            cors_origin: "*".to_string(),
            site_base_url: DEFAULT_SITE_BASE_URL.to_string(),
            request_timeout_secs: 30,
            redirect_max_polls: 10,
            redirect_wait_for_total_time: false,
            sentry_dsn: None,
        }
    }
}

/// the slice of config every scraping component gets handed at construction
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub redirect_max_polls: u32,
    pub redirect_wait_for_total_time: bool,
    browser_headers: HeaderMap,
}

impl SiteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let browser_headers = Self::build_browser_headers(&base_url);

        Self {
            base_url,
            request_timeout: Duration::from_secs(30),
            redirect_max_polls: 10,
            redirect_wait_for_total_time: false,
            browser_headers,
        }
    }

    /// headers sent on every non-catalog fetch so the site treats us like a browser
    pub fn browser_headers(&self) -> &HeaderMap {
        &self.browser_headers
    }

    /// joins a site relative path like `/some-movie.html` onto the base url.
    /// `None` when the result would land on another host, e.g. `@other.host/x` or `.other.host`
    pub fn site_url(&self, path: &str) -> Option<String> {
        let joined = format!("{}{}", self.base_url, path);

        let base = Url::parse(&self.base_url).ok()?;
        let url = Url::parse(&joined).ok()?;

        let same_site = url.host_str() == base.host_str()
            && url.port_or_known_default() == base.port_or_known_default()
            && url.username().is_empty()
            && url.password().is_none();

        same_site.then_some(joined)
    }

    fn build_browser_headers(base_url: &str) -> HeaderMap {
        let referer = HeaderValue::from_str(base_url)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_SITE_BASE_URL));

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::REFERER, referer);
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers
    }
}

impl From<&AppConfig> for SiteConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            redirect_max_polls: config.redirect_max_polls,
            redirect_wait_for_total_time: config.redirect_wait_for_total_time,
            ..Self::new(config.site_base_url.clone())
        }
    }
}
