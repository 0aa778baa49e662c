mod common;

use axum::http::{header, StatusCode};
use common::*;

async fn begin_login(app: &TestApp) -> String {
    let response = app.send(get_request("/v1/auth/github/login")).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location")
        .to_string();
    assert!(location.starts_with(&format!("{}/login/oauth/authorize?", app.provider_base)));

    let state = cookie_from(&response, "oauth_state").expect("state cookie");
    assert!(location.contains(&format!("state={}", state)));
    state
}

fn callback_request(code: &str, state: &str, cookie_state: &str) -> axum::http::Request<axum::body::Body> {
    with_cookie(
        "GET",
        &format!("/v1/auth/github/callback?code={}&state={}", code, state),
        &format!("oauth_state={}", cookie_state),
    )
}

#[tokio::test]
async fn test_login_redirects_with_state_cookie() {
    let app = TestApp::start().await;
    let state = begin_login(&app).await;
    assert_eq!(state.len(), 64);
}

#[tokio::test]
async fn test_unknown_provider_login_is_not_found() {
    let app = TestApp::start().await;

    let response = app.send(get_request("/v1/auth/gitlab/login")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "UNKNOWN_PROVIDER");
}

#[tokio::test]
async fn test_callback_links_user_and_stores_provider_token() {
    let app = TestApp::start().await;
    let state = begin_login(&app).await;

    let response = app.send(callback_request(GOOD_CODE, &state, &state)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = cookie_from(&response, "auth_token").expect("session cookie");
    let cleared_state = cookie_from(&response, "oauth_state");
    assert_eq!(cleared_state.as_deref(), Some(""));

    let page = read_body(response).await;
    assert!(page.contains("oauth-success"));
    assert!(page.contains(r#""tokenType":"Bearer""#));
    assert!(page.contains(r#""https://portal.example.com""#));
    assert!(!page.contains(PROVIDER_TOKEN));

    let claims = app.state.auth.validate_jwt(&session).unwrap();
    let user_uuid = app.linked_user().await;
    assert_eq!(claims.user_uuid, Some(user_uuid));

    let token = app
        .state
        .auth
        .get_provider_access_token(&user_uuid.to_string(), "github")
        .await
        .unwrap();
    assert_eq!(token.as_str(), PROVIDER_TOKEN);

    let response = app
        .send(with_bearer("GET", "/v1/auth/github/status", &session))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let status = read_json(response).await;
    assert_eq!(status["connected"], true);
    assert!(status["expiresAt"].is_string());

    let response = app
        .send(with_bearer("DELETE", "/v1/auth/github", &session))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .send(with_bearer("GET", "/v1/auth/github/status", &session))
        .await;
    assert_eq!(read_json(response).await["connected"], false);
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let app = TestApp::start().await;
    let state = begin_login(&app).await;

    let response = app
        .send(callback_request(GOOD_CODE, "forged-state", &state))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(cookie_from(&response, "auth_token").is_none());

    let page = read_body(response).await;
    assert!(page.contains("oauth-error"));
    assert!(page.contains("OAuth state mismatch"));
}

#[tokio::test]
async fn test_callback_reports_exchange_failure_without_code() {
    let app = TestApp::start().await;
    let state = begin_login(&app).await;

    let response = app
        .send(callback_request("leaked-code-123", &state, &state))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let page = read_body(response).await;
    assert!(page.contains("oauth-error"));
    assert!(page.contains("CODE_EXCHANGE_FAILED"));
    assert!(!page.contains("leaked-code-123"));
}

#[tokio::test]
async fn test_callback_relays_provider_denial() {
    let app = TestApp::start().await;

    let response = app
        .send(with_cookie(
            "GET",
            "/v1/auth/github/callback?error=access_denied&state=s",
            "oauth_state=s",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_body(response).await.contains("access_denied"));
}

#[tokio::test]
async fn test_status_for_unlinked_session_is_disconnected() {
    let app = TestApp::start().await;
    let token = app.token_for(None, 3600);

    let response = app
        .send(with_bearer("GET", "/v1/auth/github/status", &token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["connected"], false);

    let response = app
        .send(with_bearer("DELETE", "/v1/auth/github", &token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
