//! Cache diagnostics and invalidation.

use axum::{
    extract::{Query, State},
    response::Json,
};
use devportal_crypto::hash_for_log;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, extractors::AuthenticatedUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntryResponse {
    pub key: String,
    pub ttl_seconds: u64,
    pub size_bytes: usize,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub prefix: String,
    pub removed: usize,
}

/// GET /v1/cache/entry?key=
///
/// Requires a session linked to a portal user.
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<EntryQuery>,
) -> Result<Json<CacheEntryResponse>, ApiError> {
    user.user_uuid()?;
    if query.key.is_empty() {
        return Err(ApiError::InvalidRequest("key must not be empty".to_string()));
    }

    let (value, ttl) = state
        .cache
        .store()
        .get_with_ttl(&query.key)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No cache entry for {}", query.key)))?;

    Ok(Json(CacheEntryResponse {
        key: query.key,
        ttl_seconds: ttl.as_secs(),
        size_bytes: value.len(),
    }))
}

/// DELETE /v1/cache?prefix=
///
/// Requires a session linked to a portal user. An empty prefix is rejected
/// rather than clearing the whole cache.
pub async fn invalidate(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let user_uuid = user.user_uuid()?;
    if query.prefix.is_empty() {
        return Err(ApiError::InvalidRequest(
            "prefix must not be empty".to_string(),
        ));
    }

    let removed = state.cache.invalidate_prefix(&query.prefix).await?;
    tracing::info!(
        prefix = %query.prefix,
        removed,
        user = %hash_for_log(&user_uuid.to_string()),
        "Invalidated cache entries"
    );

    Ok(Json(InvalidateResponse {
        prefix: query.prefix,
        removed,
    }))
}
