//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use review_core::ReviewError;
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No active review session. Request the next word first.")]
    NoActiveSession,

    #[error("No more words due for review today.")]
    NoMoreReviews,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NoActiveSession => ApiError::NoActiveSession,
            ReviewError::ItemNotInSession { item_id } => {
                ApiError::NotFound(format!("Word {} is not in the current review session", item_id))
            }
            // Loader errors come from our own database layer; hand them back unchanged.
            ReviewError::LoaderFailure(source) => match source.downcast::<ApiError>() {
                Ok(api_error) => *api_error,
                Err(other) => ApiError::Internal(other.to_string()),
            },
            ReviewError::CorruptSession { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NoActiveSession => (StatusCode::BAD_REQUEST, "no_active_session"),
            ApiError::NoMoreReviews => (StatusCode::NOT_FOUND, "no_more_reviews"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
