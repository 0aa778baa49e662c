use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Json, Response},
};
use devportal_auth::{generate_state, AuthError, CallbackOutcome, CallbackPayload};
use devportal_crypto::hash_for_log;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::helpers::{callback_page, format_timestamp_rfc3339};
use crate::{
    cookies::{
        clear_session_cookie, clear_state_cookie, cookie_value, session_cookie,
        session_credential, state_cookie, STATE_COOKIE,
    },
    error::ApiError,
    extractors::AuthenticatedUser,
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub username: String,
    pub email: Option<String>,
    pub user_uuid: Option<Uuid>,
    pub display_name: Option<String>,
    pub expires_at: String,
    pub providers: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusResponse {
    pub provider: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/auth/:provider/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Response, ApiError> {
    let oauth_state = generate_state();
    let url = state.auth.auth_url(&provider, &oauth_state)?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, url),
            (header::SET_COOKIE, state_cookie(&oauth_state)),
        ],
    )
        .into_response())
}

/// GET /v1/auth/:provider/callback
///
/// Always answers with a page that relays the outcome to the opener window.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    match complete_login(&state, &provider, &query, &headers).await {
        Ok(outcome) => {
            let message = json!({
                "type": "oauth-success",
                "payload": CallbackPayload::from(&outcome),
            });

            (
                StatusCode::OK,
                AppendHeaders([
                    (
                        header::SET_COOKIE,
                        session_cookie(&outcome.session_token, state.session_ttl),
                    ),
                    (header::SET_COOKIE, clear_state_cookie()),
                ]),
                Html(callback_page(&message, &state.frontend_origin)),
            )
                .into_response()
        }
        Err(err) => {
            let (status, code, error, details) = err.parts();
            tracing::warn!(provider = %provider, code, "OAuth callback failed");

            let message = json!({
                "type": "oauth-error",
                "error": error,
                "code": code,
                "details": details,
            });

            (
                status,
                AppendHeaders([(header::SET_COOKIE, clear_state_cookie())]),
                Html(callback_page(&message, &state.frontend_origin)),
            )
                .into_response()
        }
    }
}

async fn complete_login(
    state: &AppState,
    provider: &str,
    query: &CallbackQuery,
    headers: &HeaderMap,
) -> Result<CallbackOutcome, ApiError> {
    if let Some(error) = &query.error {
        let reason = query.error_description.as_deref().unwrap_or(error);
        return Err(ApiError::InvalidRequest(format!(
            "Provider denied authorization: {}",
            reason
        )));
    }

    let code = query
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Missing authorization code".to_string()))?;
    let returned_state = query
        .state
        .as_deref()
        .filter(|state| !state.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Missing state parameter".to_string()))?;
    let expected_state = cookie_value(headers, STATE_COOKIE)
        .ok_or_else(|| ApiError::InvalidRequest("Missing OAuth state cookie".to_string()))?;

    if !bool::from(expected_state.as_bytes().ct_eq(returned_state.as_bytes())) {
        tracing::warn!(
            provider,
            state_hash = %hash_for_log(returned_state),
            "OAuth state mismatch"
        );
        return Err(ApiError::InvalidRequest("OAuth state mismatch".to_string()));
    }

    Ok(state
        .auth
        .handle_callback(provider, code, returned_state)
        .await?)
}

/// POST /v1/auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = session_credential(&headers).ok_or(ApiError::AuthenticationRequired)?;
    let refreshed = state
        .auth
        .refresh_jwt(token)
        .map_err(|_| ApiError::InvalidSession)?;

    Ok((
        [(
            header::SET_COOKIE,
            session_cookie(&refreshed, state.session_ttl),
        )],
        Json(RefreshResponse {
            access_token: refreshed,
        }),
    )
        .into_response())
}

/// POST /v1/auth/logout
///
/// Clears the session cookie. Issued tokens stay valid until they expire.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let claims = session_credential(&headers).and_then(|token| state.auth.validate_jwt(token).ok());
    state.auth.logout(claims.as_ref());

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(LogoutResponse { success: true }),
    )
        .into_response()
}

/// GET /v1/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<MeResponse>, ApiError> {
    let display_name = match user.claims.user_uuid {
        Some(user_uuid) => state
            .users
            .get_user(user_uuid)
            .await?
            .and_then(|entry| entry.display_name),
        None => None,
    };

    let expires_at = u64::try_from(user.claims.exp).map_err(|_| ApiError::InvalidSession)?;

    Ok(Json(MeResponse {
        username: user.claims.username,
        email: user.claims.email,
        user_uuid: user.claims.user_uuid,
        display_name,
        expires_at: format_timestamp_rfc3339(expires_at)?,
        providers: state.auth.provider_names().map(str::to_string).collect(),
    }))
}

/// GET /v1/auth/:provider/status
pub async fn provider_status(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(provider): Path<String>,
) -> Result<Json<ProviderStatusResponse>, ApiError> {
    if !state.auth.is_configured(&provider) {
        return Err(AuthError::UnknownProvider(provider).into());
    }

    let expiry = match user.claims.user_uuid {
        Some(user_uuid) => state.auth.provider_token_expiry(user_uuid, &provider).await?,
        None => None,
    };

    Ok(Json(ProviderStatusResponse {
        provider,
        connected: expiry.is_some(),
        expires_at: expiry.map(format_timestamp_rfc3339).transpose()?,
    }))
}

/// DELETE /v1/auth/:provider
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(provider): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_uuid = user.user_uuid()?;
    state.auth.disconnect_provider(user_uuid, &provider).await?;
    Ok(StatusCode::NO_CONTENT)
}
