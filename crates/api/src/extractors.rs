//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use portal_common::AppError;
use serde::de::DeserializeOwned;

/// JSON body extractor whose rejections use the portal's error shape.
///
/// A body that cannot be read or parsed is treated as a server-side failure,
/// the same as any other unexpected error in the handler.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))
    }
}
