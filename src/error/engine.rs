use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum EngineError {
    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ractor error: {0}")]
    Actor(String),

    /// A downstream handler asked for `CommentContext` outside the engine layer.
    #[error("Comment context missing from request extensions")]
    ContextMissing,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> axum::response::Response {
        if let EngineError::Database(_)
        | EngineError::Actor(_)
        | EngineError::Config(_)
        | EngineError::ContextMissing = &self
        {
            error!(error = %self, "comment engine internal error");
        }

        let (status, error_body) = match self {
            EngineError::NotFound => (
                StatusCode::NOT_FOUND,
                ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: "Not found.".to_string(),
                },
            ),

            EngineError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ApiErrorObject {
                    code: "METHOD_NOT_ALLOWED".to_string(),
                    message: "Method not allowed.".to_string(),
                },
            ),

            EngineError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "BAD_REQUEST".to_string(),
                    message,
                },
            ),

            EngineError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiErrorObject {
                    code: "PAYLOAD_TOO_LARGE".to_string(),
                    message: format!("Request body exceeds {limit} bytes."),
                },
            ),

            EngineError::Database(_)
            | EngineError::Actor(_)
            | EngineError::Config(_)
            | EngineError::ContextMissing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
