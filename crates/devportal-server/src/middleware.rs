use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    middleware::Next,
};
use std::sync::Arc;
use std::time::Instant;

use crate::{cookies::session_credential, error::ApiError, state::AppState};

/// Session gate for the protected API
///
/// Accepts the session JWT from `Authorization: Bearer` or the
/// `auth_token` cookie. Verified claims are stored in the request
/// extensions for [`AuthenticatedUser`](crate::extractors::AuthenticatedUser).
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response<Body>, ApiError> {
    let Some(token) = session_credential(req.headers()) else {
        tracing::debug!(uri = %req.uri(), "Request without session credential");
        return Err(ApiError::AuthenticationRequired);
    };

    let claims = state.auth.validate_jwt(token).map_err(|_| {
        tracing::debug!(uri = %req.uri(), "Rejected session token");
        ApiError::InvalidSession
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Request ID middleware for request tracking and logging
///
/// Reuses an incoming `X-Request-ID` or generates one, echoes it on the
/// response and logs start and completion with timing.
pub async fn request_id_middleware(mut req: Request<Body>, next: Next) -> Response<Body> {
    let request_id = req
        .headers()
        .get("X-Request-ID")
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if let Ok(header_value) = request_id.parse() {
        req.headers_mut().insert("X-Request-ID", header_value);
    } else {
        tracing::warn!("Failed to create header value for request ID");
    }

    tracing::info!(
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
        "Request started"
    );

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-ID", header_value);
    }

    tracing::info!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = elapsed.as_millis(),
        "Request completed"
    );

    response
}
