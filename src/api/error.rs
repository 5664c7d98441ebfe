//! HTTP error responses.
//!
//! Every failure leaves the API as `{ "error": "<message>" }` with a status code chosen
//! from the core error variant. Request bodies are read with [`ApiJson`] so malformed
//! JSON gets the same shape.

use crate::errors::Error;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Human readable message
    pub error: String,
}

/// Failure of an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request carried no caller identity.
    #[error("missing x-user-id header")]
    Unauthorized,
    /// The request body was not the JSON the endpoint expects.
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
    /// A core operation failed.
    #[error(transparent)]
    Core(#[from] Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidBody(rejection) => rejection.status(),
            Self::Core(error) => match error {
                Error::NotFound { .. } => StatusCode::NOT_FOUND,
                Error::Forbidden { .. } => StatusCode::FORBIDDEN,
                Error::Validation { .. }
                | Error::InvalidAmount { .. }
                | Error::InvalidRating { .. }
                | Error::MissingTrackingNumber => StatusCode::BAD_REQUEST,
                Error::InvalidTransition { .. }
                | Error::ReviewAlreadyExists { .. }
                | Error::InsufficientStock { .. } => StatusCode::CONFLICT,
                Error::Config { .. }
                | Error::Database(_)
                | Error::Io(_)
                | Error::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejections use the `{ "error": .. }` body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
