/**
 * Envelope-Aware Extractors
 *
 * Thin wrappers over axum's `Json` and `Query` extractors whose rejections
 * are `ApiError`s, so malformed bodies and query strings still come back
 * in the standard failure envelope.
 */

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::backend::error::types::ApiError;

/// JSON request body
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::warn!("Rejected JSON body: {}", rejection.body_text());
                Err(ApiError::bad_request(rejection.body_text()))
            }
        }
    }
}

/// Query-string parameters
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => {
                tracing::warn!("Rejected query string: {}", rejection.body_text());
                Err(ApiError::bad_request(rejection.body_text()))
            }
        }
    }
}
