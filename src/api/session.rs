//! Extracts the caller's [`Session`] from the request.
//!
//! Authentication is terminated upstream; the gateway forwards the authenticated user id
//! in the `X-User-Id` header.

use super::error::ApiError;
use crate::core::session::Session;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(Session::new)
            .ok_or(ApiError::Unauthorized)
    }
}
