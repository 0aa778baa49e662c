#![allow(dead_code)]

use axum::{
    body::Body,
    extract::Form,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use devportal_auth::ExternalProfile;
use devportal_server::{create_router, AppState, Config};
use serde::Deserialize;
use serde_json::json;
use std::{collections::HashMap, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

pub const GOOD_CODE: &str = "good-code";
pub const PROVIDER_TOKEN: &str = "gho_server_test_token";
pub const LINKED_EMAIL: &str = "octo@example.com";
pub const JWT_SECRET: &str = "server-test-secret-that-is-long-enough";
pub const ENCRYPTION_KEY: &str = "QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkI=";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub provider_base: String,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn start() -> Self {
        let provider_base = spawn_mock_github().await;
        let db_dir = TempDir::new().expect("temp dir");

        let yaml = format!(
            r#"
database_path: {db}
frontend_origin: https://portal.example.com
jwt_issuer: devportal-server-test
redirect_url: http://localhost:8080/v1/auth
providers:
  github:
    client_id: server-client
    client_secret: server-secret
    base_url: {base}
users:
  - email: {email}
    display_name: Octo Cat
"#,
            db = db_dir.path().join("db").display(),
            base = provider_base,
            email = LINKED_EMAIL,
        );

        let env: HashMap<&str, &str> = [
            ("JWT_SECRET", JWT_SECRET),
            ("TOKEN_ENCRYPTION_KEY", ENCRYPTION_KEY),
        ]
        .into_iter()
        .collect();

        let config = Config::from_sources(Some(&yaml), |name| env.get(name).map(|v| v.to_string()))
            .expect("config");
        let state = Arc::new(AppState::new(config).await.expect("state"));

        Self {
            router: create_router(state.clone()),
            state,
            provider_base,
            _db_dir: db_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Session token for a profile, optionally linked to a directory user
    pub fn token_for(&self, user_uuid: Option<uuid::Uuid>, ttl_secs: i64) -> String {
        self.state
            .auth
            .generate_jwt_with_ttl(
                &ExternalProfile {
                    id: "583231".to_string(),
                    login: "octocat".to_string(),
                    email: Some(LINKED_EMAIL.to_string()),
                    name: Some("The Octocat".to_string()),
                    avatar_url: None,
                    user_uuid,
                },
                ttl_secs,
            )
            .expect("token")
    }

    pub async fn linked_user(&self) -> uuid::Uuid {
        self.state
            .users
            .find_by_email(LINKED_EMAIL)
            .await
            .expect("lookup")
            .expect("seeded user")
            .user_uuid
    }
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn with_bearer(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

pub fn with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8")
}

pub async fn read_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&read_body(response).await).expect("json")
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value assigned to `name` by the response's `Set-Cookie` headers
pub fn cookie_from(response: &Response, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|cookie| {
        let (pair, _) = cookie.split_once(';')?;
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[derive(Deserialize)]
struct TokenForm {
    code: String,
}

async fn token_endpoint(Form(form): Form<TokenForm>) -> Response {
    if form.code == GOOD_CODE {
        Json(json!({
            "access_token": PROVIDER_TOKEN,
            "token_type": "bearer",
            "scope": "read:user,user:email,repo"
        }))
        .into_response()
    } else {
        Json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        }))
        .into_response()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", PROVIDER_TOKEN).as_str())
}

async fn user_endpoint(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
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
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([{"email": LINKED_EMAIL, "primary": true, "verified": true}])).into_response()
}

/// Start a mock GitHub Enterprise instance, returning its base URL
async fn spawn_mock_github() -> String {
    let app = Router::new()
        .route("/login/oauth/access_token", post(token_endpoint))
        .route("/api/v3/user", get(user_endpoint))
        .route("/api/v3/user/emails", get(emails_endpoint));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock provider");
    });

    format!("http://{}", addr)
}
