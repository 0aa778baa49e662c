//! # devportal-server
//!
//! HTTP surface of the developer portal auth core: OAuth login and
//! callback, session refresh and logout, provider connection status, and
//! response cache maintenance.

pub mod api;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod state;

use axum::{
    http::{header, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub use config::Config;
pub use state::AppState;

/// Build the application router
///
/// Routes under the session gate are only reachable with a valid JWT.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/v1/auth/me", get(api::auth::me))
        .route("/v1/auth/:provider/status", get(api::auth::provider_status))
        .route("/v1/auth/:provider", delete(api::auth::disconnect))
        .route("/v1/cache/entry", get(api::cache::get_entry))
        .route("/v1/cache", delete(api::cache::invalidate))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    let cors = CorsLayer::new()
        .allow_origin(state.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        // Health checks
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))

        // OAuth login and session lifecycle
        .route("/v1/auth/:provider/login", get(api::auth::login))
        .route("/v1/auth/:provider/callback", get(api::auth::callback))
        .route("/v1/auth/refresh", post(api::auth::refresh))
        .route("/v1/auth/logout", post(api::auth::logout))

        .merge(protected)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(cors)
        .with_state(state)
}
