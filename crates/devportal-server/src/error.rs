use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devportal_auth::AuthError;
use devportal_cache::CacheError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: String,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No session credential on the request
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Credential present but rejected
    #[error("Invalid or expired token")]
    InvalidSession,

    /// Session is not linked to a directory user
    #[error("Session is not linked to a portal user")]
    NotLinked,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Status, machine-readable code, message and details for the response
    ///
    /// Internal failures are logged here and reported generically.
    pub fn parts(&self) -> (StatusCode, &'static str, String, String) {
        match self {
            ApiError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                "Invalid request".to_string(),
                msg.clone(),
            ),
            ApiError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
                "Provide a bearer token or session cookie".to_string(),
            ),
            ApiError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
                "Sign in again to obtain a new session".to_string(),
            ),
            ApiError::NotLinked => (
                StatusCode::FORBIDDEN,
                "USER_NOT_LINKED",
                self.to_string(),
                "No portal user matches the email of this session".to_string(),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Not found".to_string(),
                msg.clone(),
            ),
            ApiError::Auth(err) => auth_parts(err),
            ApiError::Cache(err) => {
                tracing::error!(error = %err, "Cache error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_ERROR",
                    "Cache operation failed".to_string(),
                    String::new(),
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    String::new(),
                )
            }
        }
    }
}

fn auth_parts(err: &AuthError) -> (StatusCode, &'static str, String, String) {
    let code = err.code();
    match err {
        AuthError::UnknownProvider(_) => (
            StatusCode::NOT_FOUND,
            code,
            "Unknown provider".to_string(),
            err.to_string(),
        ),
        AuthError::CodeExchange(_) | AuthError::ProfileFetch(_) | AuthError::UpstreamTimeout => {
            tracing::warn!(error = %err, "Upstream provider failure");
            (
                StatusCode::BAD_GATEWAY,
                code,
                "Sign-in with the provider failed".to_string(),
                err.to_string(),
            )
        }
        AuthError::InvalidToken => (
            StatusCode::UNAUTHORIZED,
            code,
            err.to_string(),
            "Sign in again to obtain a new session".to_string(),
        ),
        AuthError::InvalidUserId(_) => (
            StatusCode::BAD_REQUEST,
            code,
            "Invalid user id".to_string(),
            err.to_string(),
        ),
        AuthError::NoValidToken { .. } => (
            StatusCode::NOT_FOUND,
            code,
            err.to_string(),
            "Reconnect the provider to continue".to_string(),
        ),
        AuthError::TokenStoreUnavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            code,
            err.to_string(),
            String::new(),
        ),
        AuthError::Config(_)
        | AuthError::TokenSigning(_)
        | AuthError::Storage(_)
        | AuthError::Crypto(_) => {
            tracing::error!(error = %err, code, "Auth failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "An internal error occurred".to_string(),
                String::new(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error, details) = self.parts();

        let body = Json(ErrorResponse {
            error,
            code: code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
