use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::constants::*;

/// Request-level failures mapped to the API's wire shapes.
///
/// Token failures deliberately answer 400 (not 401) with a `{code, error}`
/// body, and credential failures answer a single generic message for both
/// unknown-login and wrong-password, so callers cannot enumerate users.
#[derive(Debug)]
pub enum ApiError {
    InvalidCredentials,
    MissingToken,
    InvalidToken,
    NotFound(&'static str),
    BadRequest(String),
    Conflict(String),
    Storage(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::MissingToken => write!(f, "missing token"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::BadRequest(msg) => write!(f, "bad request: {}", msg),
            Self::Conflict(msg) => write!(f, "conflict: {}", msg),
            Self::Storage(detail) => write!(f, "storage failure: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": ERR_INVALID_PASSWORD }),
            ),
            Self::MissingToken => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "code": 400, "error": ERR_ACCESS_DENIED }),
            ),
            Self::InvalidToken => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "code": 400, "error": ERR_INVALID_TOKEN }),
            ),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "message": format!("{} not found", what) }),
            ),
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "message": msg }),
            ),
            Self::Conflict(msg) => (StatusCode::CONFLICT, serde_json::json!({ "message": msg })),
            Self::Storage(detail) => {
                // Raw driver detail stays server-side.
                tracing::error!(detail = %detail, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "message": ERR_DATABASE_OPERATION }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<libsql::Error> for ApiError {
    fn from(e: libsql::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
