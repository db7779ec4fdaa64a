// the hop between the catalog's obfuscated link and the actual file host. The page hides a json
// payload across a few ck('_wp_http_N', ...) calls, the payload says where to go next and the
// next page keeps answering "Invalid Request" until it's ready.
//
// none of this is allowed to fail the request, worst case the caller gets its own link back
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::HeaderMap;
use tracing::{debug, info, warn};

use crate::{
    config::SiteConfig,
    server::{
        services::fetch_services::DynPageFetcher,
        utils::{
            cipher_utils::{self, CipherError},
            pattern_utils,
        },
    },
};

pub type DynRedirectResolver = Arc<dyn RedirectResolverTrait + Send + Sync>;

// the site's player adds this on top of total_time before it polls
const TOTAL_TIME_GRACE_SECS: u64 = 3;

#[derive(thiserror::Error, Debug)]
pub enum RedirectError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] crate::server::error::Error),

    #[error("page had no _wp_http token")]
    MissingToken,

    #[error("token did not decode")]
    Undecodable,

    #[error(transparent)]
    Payload(#[from] CipherError),

    #[error("link still invalid after {0} polls")]
    PollsExhausted(u32),
}

#[automock]
#[async_trait]
pub trait RedirectResolverTrait {
    /// walks the redirect page behind `link`, returns `link` itself if anything goes wrong
    async fn resolve(&self, link: &str, headers: &HeaderMap) -> String;
}

pub struct RedirectResolver {
    fetcher: DynPageFetcher,
    config: Arc<SiteConfig>,
}

impl RedirectResolver {
    pub fn new(fetcher: DynPageFetcher, config: Arc<SiteConfig>) -> Self {
        Self { fetcher, config }
    }

    pub fn follow_up_url(base: &str, data: &str) -> String {
        // the site expects the raw base64 here, not url encoded
        format!("{}?re={}", base, cipher_utils::encode_simple(data))
    }

    async fn try_resolve(&self, link: &str, headers: &HeaderMap) -> Result<String, RedirectError> {
        let body = self.fetcher.fetch_text(link, headers).await?;

        let token = pattern_utils::collect_wp_http_token(&body);
        if token.is_empty() {
            return Err(RedirectError::MissingToken);
        }

        let payload = cipher_utils::decode_layered(&token).ok_or(RedirectError::Undecodable)?;
        let data = payload.require_str("data")?;
        let base = payload.require_str("wp_http1")?;
        let follow_up = Self::follow_up_url(base, data);
        debug!("follow-up link for {}: {}", link, follow_up);

        if self.config.redirect_wait_for_total_time {
            let wait = payload.get_u64("total_time").unwrap_or(0) + TOTAL_TIME_GRACE_SECS;
            info!("waiting {}s before polling {}", wait, follow_up);
            tokio::time::sleep(Duration::from_secs(wait)).await;
        }

        for attempt in 1..=self.config.redirect_max_polls {
            let body = self.fetcher.fetch_text(&follow_up, headers).await?;

            if pattern_utils::is_invalid_request(&body) {
                debug!("poll {} of {} not ready yet", attempt, follow_up);
                continue;
            }

            // the inner target only tells us the page is ready, the follow-up link is what the
            // caller gets back. Kept this way because that's what the downstream hops expect.
            let target =
                pattern_utils::extract_reurl(&body).unwrap_or_else(|| follow_up.clone());
            debug!("poll {} ready, page points at {}", attempt, target);

            return Ok(follow_up);
        }

        Err(RedirectError::PollsExhausted(self.config.redirect_max_polls))
    }
}

#[async_trait]
impl RedirectResolverTrait for RedirectResolver {
    async fn resolve(&self, link: &str, headers: &HeaderMap) -> String {
        match self.try_resolve(link, headers).await {
            Ok(resolved) => {
                info!("resolved {} -> {}", link, resolved);
                resolved
            }
            Err(e) => {
                warn!("couldn't resolve redirect for {}, keeping it: {}", link, e);
                link.to_string()
            }
        }
    }
}
