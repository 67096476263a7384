use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the token lifecycle core.
///
/// Variants stay distinct so logs can tell expiry from tampering, but every
/// authentication sub-case renders identically to the client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    CredentialInvalid,

    #[error("token invalid")]
    TokenInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("token kind mismatch")]
    TokenKindMismatch,

    #[error("refresh token replay detected")]
    ReplayDetected,

    #[error("refresh store unavailable")]
    StoreUnavailable,

    #[error("signing key unavailable")]
    KeyUnavailable,
}

impl AuthError {
    /// Only store outages may be retried; cryptographic and claim failures are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable)
    }

    pub fn is_server_side(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable | AuthError::KeyUnavailable)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            AppError::Validation(s) => (StatusCode::BAD_REQUEST, s.as_str()),
            AppError::Auth(e) if e.is_server_side() => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
        };

        let mut resp = (status, Json(json!({ "error": msg }))).into_response();
        if matches!(&self, AppError::Auth(e) if e.is_retryable()) {
            resp.headers_mut().insert(RETRY_AFTER, HeaderValue::from_static("1"));
        }
        resp
    }
}
