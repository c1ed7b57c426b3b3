//! Path and query string extractors that reject with [`AppError`].
//!
//! axum's own rejections render as plain text, which would skip the error
//! envelope and its localization.

use axum::{
    async_trait,
    extract::{rejection::PathRejection, FromRequestParts, Path as AxumPath, Query as AxumQuery},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use common::AppError;

/// Typed path parameters.
pub struct Path<T>(pub T);

/// Typed query string.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumPath::<T>::from_request_parts(parts, state).await {
            Ok(AxumPath(value)) => Ok(Path(value)),
            Err(PathRejection::FailedToDeserializePathParams(e)) => {
                debug!(path = %parts.uri.path(), "Rejected path parameters: {}", e.body_text());
                Err(AppError::validation("error.validation"))
            }
            // Route and handler disagree on the parameters
            Err(e) => Err(AppError::internal(e.body_text())),
        }
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(value)) => Ok(QueryParams(value)),
            Err(e) => {
                debug!("Rejected query string: {}", e.body_text());
                Err(AppError::validation("error.validation"))
            }
        }
    }
}
