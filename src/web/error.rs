//! Typed API error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Machine-readable error code included in every error body.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    InvalidParameter,
    Unauthorized,
    Database,
    UpstreamFailed,
}

/// An API-facing error: `{ "error": code, "message": ... }` with a status
/// derived from the code.
#[derive(Debug)]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code {
            ApiErrorCode::InvalidParameter => StatusCode::BAD_REQUEST,
            ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Database => StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorCode::UpstreamFailed => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code,
            "message": self.message,
        }));
        (self.status(), body).into_response()
    }
}

/// Log a database failure with context and map it to an opaque 500.
pub fn db_error(context: &str, err: anyhow::Error) -> ApiError {
    error!(error = ?err, "{context}");
    ApiError::new(ApiErrorCode::Database, format!("{context} failed"))
}
