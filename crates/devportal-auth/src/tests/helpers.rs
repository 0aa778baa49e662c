//! Test helpers: service builders and a local mock GitHub Enterprise.

use crate::*;
use axum::{
    extract::Form,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use devportal_crypto::CipherContext;
use devportal_storage::RocksDbStorage;
use serde::Deserialize;
use serde_json::json;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use zeroize::Zeroizing;

pub const GOOD_CODE: &str = "good-code";
pub const SLOW_CODE: &str = "slow-code";
pub const BROKEN_PROFILE_CODE: &str = "broken-profile-code";
pub const PROVIDER_TOKEN: &str = "gho_mock_provider_token";
pub const PROFILE_EMAIL: &str = "octo@example.com";
pub const TEST_SECRET: &str = "test-jwt-secret-that-is-long-enough-for-hs256";

pub type TestService = AuthService<RocksDbStorage, StaticUserDirectory>;

#[derive(Deserialize)]
struct TokenForm {
    code: String,
}

async fn token_endpoint(Form(form): Form<TokenForm>) -> Response {
    match form.code.as_str() {
        GOOD_CODE => Json(json!({
            "access_token": PROVIDER_TOKEN,
            "token_type": "bearer",
            "scope": "read:user,repo"
        }))
        .into_response(),
        SLOW_CODE => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"access_token": PROVIDER_TOKEN})).into_response()
        }
        BROKEN_PROFILE_CODE => Json(json!({"accessToken": "broken"})).into_response(),
        _ => Json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        }))
        .into_response(),
    }
}

fn bearer_matches(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", PROVIDER_TOKEN))
        .unwrap_or(false)
}

async fn user_endpoint(headers: HeaderMap) -> Response {
    if !bearer_matches(&headers) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({
        "id": 583231,
        "login": "octocat",
        "name": "The Octocat",
        "email": null,
        "avatar_url": "https://avatars.example.com/u/583231"
    }))
    .into_response()
}

async fn emails_endpoint(headers: HeaderMap) -> Response {
    if !bearer_matches(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        {"email": "noreply@example.com", "primary": false, "verified": true},
        {"email": PROFILE_EMAIL, "primary": true, "verified": true}
    ]))
    .into_response()
}

/// Start a mock GitHub Enterprise instance, returning its base URL
pub async fn spawn_mock_github() -> String {
    let app = Router::new()
        .route("/login/oauth/access_token", post(token_endpoint))
        .route("/api/v3/user", get(user_endpoint))
        .route("/api/v3/user/emails", get(emails_endpoint));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn auth_config(github_base_url: &str) -> AuthConfig {
    let mut providers = BTreeMap::new();
    providers.insert(
        "github".to_string(),
        ProviderSettings {
            client_id: "mock-client".to_string(),
            client_secret: Zeroizing::new("mock-secret".to_string()),
            enterprise_base_url: Some(github_base_url.to_string()),
            scopes: None,
        },
    );

    AuthConfig {
        jwt_secret: Zeroizing::new(TEST_SECRET.to_string()),
        jwt_ttl: Duration::from_secs(3600),
        jwt_issuer: "devportal-test".to_string(),
        redirect_url: "http://localhost:8080/v1/auth".to_string(),
        access_token_ttl: Duration::from_secs(30 * 86400),
        callback_timeout: Duration::from_secs(10),
        http_timeout: Duration::from_secs(10),
        providers,
    }
}

pub fn create_token_store() -> Arc<ProviderTokenStore<RocksDbStorage>> {
    let storage = Arc::new(RocksDbStorage::open_test().unwrap());
    let cipher = Arc::new(CipherContext::new([42u8; 32]));
    Arc::new(ProviderTokenStore::new(storage, cipher))
}

pub fn create_service(
    config: AuthConfig,
    users: StaticUserDirectory,
    token_store: Option<Arc<ProviderTokenStore<RocksDbStorage>>>,
) -> TestService {
    AuthService::new(config, Arc::new(users), token_store).unwrap()
}

pub fn profile(user_uuid: Option<uuid::Uuid>) -> ExternalProfile {
    ExternalProfile {
        id: "583231".to_string(),
        login: "octocat".to_string(),
        email: Some(PROFILE_EMAIL.to_string()),
        name: Some("The Octocat".to_string()),
        avatar_url: None,
        user_uuid,
    }
}
