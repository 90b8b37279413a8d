use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::ollama::OllamaError;

/// Every failure the pipeline can surface to a caller. Variants carrying a
/// String hold server-side detail that is logged but never echoed; the
/// `#[error]` text is the only thing a client sees.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid or missing API key")]
    Unauthorized,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Failed to connect to AI model")]
    BackendUnreachable(String),
    #[error("AI model request failed")]
    Backend(String),
    #[error("Request timeout. The AI model took too long to respond.")]
    Timeout,
    #[error("Empty response from AI model")]
    EmptyResponse,
    #[error("AI model returned invalid JSON. Please try again.")]
    Parse(String),
    #[error("{0}")]
    IncompleteOutput(String),
    #[error("Generated content failed security validation")]
    ContentSecurity(String),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BackendUnreachable(_)
            | ApiError::Backend(_)
            | ApiError::EmptyResponse
            | ApiError::Parse(_)
            | ApiError::IncompleteOutput(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::ContentSecurity(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OllamaError> for ApiError {
    fn from(err: OllamaError) -> Self {
        match err {
            OllamaError::Unreachable(detail) => ApiError::BackendUnreachable(detail),
            OllamaError::Timeout => ApiError::Timeout,
            OllamaError::Status { status, body } => {
                ApiError::Backend(format!("status={status} body={body}"))
            }
            OllamaError::Empty => ApiError::EmptyResponse,
            OllamaError::Decode(detail) => ApiError::Backend(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::BackendUnreachable(detail) => error!("❌ Backend unreachable: {detail}"),
            ApiError::Backend(detail) => error!("❌ Backend request failed: {detail}"),
            ApiError::Timeout => error!("❌ Backend request timed out"),
            ApiError::Parse(detail) => error!("❌ JSON decode error: {detail}"),
            ApiError::IncompleteOutput(detail) => error!("❌ Incomplete generation: {detail}"),
            ApiError::ContentSecurity(detail) => warn!("⚠️ Content screen rejection: {detail}"),
            ApiError::Internal(err) => {
                let request_id = Uuid::new_v4();
                error!(%request_id, "❌ Unhandled error: {err:#}");
                let body = json!({
                    "detail": "Internal server error",
                    "request_id": request_id.to_string(),
                });
                return (status, Json(body)).into_response();
            }
            _ => {}
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
