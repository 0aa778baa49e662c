use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: &'static str,
    cache: &'static str,
    providers: Vec<String>,
}

/// Readiness check endpoint
///
/// The state only exists once storage and the auth service are up, so
/// reaching the handler means the server is ready.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready",
        cache: if state.cache.store().is_enabled() {
            "enabled"
        } else {
            "disabled"
        },
        providers: state.auth.provider_names().map(str::to_string).collect(),
    })
}
