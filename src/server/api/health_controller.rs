use axum::Extension;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

use crate::Logger;
use crate::server::dtos::health_dto::HealthResponse;
use crate::server::services::AppServices;
use crate::server::{get_app_version, get_uptime_seconds};

/// liveness only, the target site is never pinged from here
/// if this isn't wanted comment out the health endpoint in ../mod.rs
pub async fn health_endpoint(
    Extension(services): Extension<AppServices>,
) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        uptime_seconds: get_uptime_seconds(),
        version: get_app_version().to_string(),
        environment: Logger::environment_name(services.config.cargo_env).to_string(),
        site_base_url: services.site.base_url.clone(),
    };

    (StatusCode::OK, Json(response))
}
