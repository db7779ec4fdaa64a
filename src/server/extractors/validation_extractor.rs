use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::server::error::Error;

/// query string that has been deserialized and validated, both failures become a json 400
pub struct ValidatedQuery<T>(pub T);

/// the app shows this string to users so pick the first human message over the debug dump
fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!("unparseable query {:?}: {}", parts.uri.query(), rejection);
                Error::BadRequest(rejection.body_text())
            })?;

        value
            .validate()
            .map_err(|errors| Error::BadRequest(first_message(&errors)))?;

        Ok(ValidatedQuery(value))
    }
}
