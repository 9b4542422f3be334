//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

// Errors

/// API-facing error taxonomy. Validation and authorization failures
/// abort before any write; a `NotFound` deliberately does not reveal
/// whether the message exists or belongs to someone else.
pub enum ApiError {
    Validation(String),
    NotFound,
    NoRecipients,
    Unauthorized,
    Internal(anyhow::Error),
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({ "error": message })),
            )
                .into_response(),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                axum::Json(json!({ "error": "message not found" })),
            )
                .into_response(),
            Self::NoRecipients => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({ "error": "no recipients could be resolved for this team" })),
            )
                .into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({ "error": "missing or unknown account" })),
            )
                .into_response(),
            Self::Internal(err) => {
                // Always log the error
                tracing::error!("{}", err);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "error": "something went wrong" })),
                )
                    .into_response()
            }
        }
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

// Re-export public types from each route

pub mod messages {
    pub use crate::api::routes::messages::public::*;
}

pub mod notifications {
    pub use crate::api::routes::notifications::public::*;
}

pub mod recipients {
    pub use crate::api::routes::recipients::public::*;
}
