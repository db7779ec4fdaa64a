use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

pub type AppResult<T> = Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    BadRequest(String),

    // anything reqwest hands back, including non 2xx statuses from the site
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),

    #[error("{0}")]
    InternalServerErrorWithContext(String),
}

impl Error {
    /// upstream failures get the endpoint's wording, everything else keeps its own message
    pub fn while_fetching(self, what: &str) -> Self {
        match self {
            Error::Upstream(e) => Error::InternalServerErrorWithContext(format!(
                "Failed to fetch {} from 4khdhub: {}",
                what, e
            )),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) | Error::InternalServerErrorWithContext(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Error::BadRequest(msg) => debug!("rejected request: {}", msg),
            Error::Upstream(e) => error!("upstream request failed: {}", e),
            Error::InternalServerErrorWithContext(msg) => {
                error!("An unexpected error occurred: {}", msg)
            }
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
