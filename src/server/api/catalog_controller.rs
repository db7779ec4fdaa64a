use axum::{Extension, Json, Router, routing::get};
use tracing::info;

use crate::server::{
    dtos::catalog_dto::{CatalogEntry, DetailRecord, LinkQuery, PostsQuery, StreamSource},
    error::AppResult,
    extractors::ValidatedQuery,
    services::AppServices,
};

pub struct CatalogController;

impl CatalogController {
    pub fn app() -> Router {
        Router::new()
            .route("/posts", get(Self::posts_endpoint))
            .route("/meta", get(Self::meta_endpoint))
            .route("/stream", get(Self::stream_endpoint))
    }

    /// GET /api/4khdhub/posts
    ///
    /// params:
    /// - `filter`: listing path like `/category/movies-10810`, empty for the front page
    /// - `page`: defaults to 1, blank counts as unset
    /// - `searchQuery`: when set, `filter` is ignored
    ///
    /// response:
    /// ```json
    /// [{ "title": "...", "link": "/some-movie-123.html", "image": "https://..." }]
    /// ```
    pub async fn posts_endpoint(
        Extension(services): Extension<AppServices>,
        ValidatedQuery(params): ValidatedQuery<PostsQuery>,
    ) -> AppResult<Json<Vec<CatalogEntry>>> {
        let posts = services
            .catalog
            .list_catalog(&params.filter, params.page(), &params.search_query)
            .await
            .map_err(|e| e.while_fetching("posts"))?;

        Ok(Json(posts))
    }

    /// GET /api/4khdhub/meta?link=/some-movie-123.html
    ///
    /// response:
    /// ```json
    /// {
    ///   "title": "...", "synopsis": "...", "image": "...", "imdbId": "",
    ///   "type": "movie",
    ///   "linkList": [{ "title": "1080p", "directLinks": [{ "title": "1080p", "link": "https://hubdrive..." }] }]
    /// }
    /// ```
    pub async fn meta_endpoint(
        Extension(services): Extension<AppServices>,
        ValidatedQuery(params): ValidatedQuery<LinkQuery>,
    ) -> AppResult<Json<DetailRecord>> {
        let detail = services
            .catalog
            .get_detail(&params.link)
            .await
            .map_err(|e| e.while_fetching("meta"))?;

        Ok(Json(detail))
    }

    /// GET /api/4khdhub/stream?link=https://hubdrive...
    ///
    /// walks the whole redirect chain so this one is slow, expect several seconds
    ///
    /// response:
    /// ```json
    /// [{ "url": "https://...", "quality": "1080p" }]
    /// ```
    pub async fn stream_endpoint(
        Extension(services): Extension<AppServices>,
        ValidatedQuery(params): ValidatedQuery<LinkQuery>,
    ) -> AppResult<Json<Vec<StreamSource>>> {
        let sources = services
            .streams
            .resolve_stream(&params.link)
            .await
            .map_err(|e| e.while_fetching("stream"))?;

        info!("resolved {} sources for {}", sources.len(), params.link);
        Ok(Json(sources))
    }
}
