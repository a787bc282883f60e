//! Request extractors that reject with [`ApiError`] bodies.

use axum::extract::{FromRequest, Request};
use axum::Json;

use super::error::ApiError;

/// `Json<T>` whose parse and validation failures answer in the
/// `{"detail", "error"}` shape instead of axum's plain-text rejection.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
