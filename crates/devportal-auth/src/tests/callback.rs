//! OAuth callback flow tests against a local mock provider.

use super::helpers::*;
use crate::*;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn test_auth_url_for_configured_provider() {
    let base = spawn_mock_github().await;
    let service = create_service(auth_config(&base), StaticUserDirectory::new(), None);

    let url = service.auth_url("github", "state-123").unwrap();

    assert!(url.starts_with(&format!("{}/login/oauth/authorize?", base)));
    assert!(url.contains("state=state-123"));
    assert!(url.contains("client_id=mock-client"));
    assert!(url.contains("github%2Fcallback"));
    assert!(!url.contains("mock-secret"));
}

#[tokio::test]
async fn test_unknown_provider() {
    let base = spawn_mock_github().await;
    let service = create_service(auth_config(&base), StaticUserDirectory::new(), None);

    assert!(matches!(
        service.auth_url("gitlab", "s"),
        Err(AuthError::UnknownProvider(p)) if p == "gitlab"
    ));
    assert!(matches!(
        service.handle_callback("gitlab", GOOD_CODE, "s").await,
        Err(AuthError::UnknownProvider(_))
    ));
    assert!(!service.is_configured("gitlab"));
    assert_eq!(service.provider_names().collect::<Vec<_>>(), vec!["github"]);
}

#[tokio::test]
async fn test_callback_links_known_user_and_stores_token() {
    let base = spawn_mock_github().await;
    let user_uuid = Uuid::new_v4();
    let users = StaticUserDirectory::new().with_user(PROFILE_EMAIL, user_uuid);
    let store = create_token_store();
    let service = create_service(auth_config(&base), users, Some(store.clone()));

    let outcome = service
        .handle_callback("github", GOOD_CODE, "state")
        .await
        .unwrap();

    assert_eq!(outcome.profile.login, "octocat");
    // Email came from the /user/emails fallback
    assert_eq!(outcome.profile.email.as_deref(), Some(PROFILE_EMAIL));
    assert_eq!(outcome.profile.user_uuid, Some(user_uuid));
    assert!(outcome.provider_token_stored);
    assert_eq!(outcome.scope.as_deref(), Some("read:user,repo"));
    assert_eq!(outcome.expires_in, 3600);

    let claims = service.validate_jwt(&outcome.session_token).unwrap();
    assert_eq!(claims.user_uuid, Some(user_uuid));
    assert_eq!(claims.username, "octocat");

    let token = service
        .get_provider_access_token(&user_uuid.to_string(), "github")
        .await
        .unwrap();
    assert_eq!(token.as_str(), PROVIDER_TOKEN);

    let expiry = service
        .provider_token_expiry(user_uuid, "github")
        .await
        .unwrap()
        .unwrap();
    assert!(expiry > devportal_crypto::current_timestamp() + 29 * 86400);
}

#[tokio::test]
async fn test_callback_without_known_user_skips_persistence() {
    let base = spawn_mock_github().await;
    let store = create_token_store();
    let service = create_service(
        auth_config(&base),
        StaticUserDirectory::new(),
        Some(store.clone()),
    );

    let outcome = service
        .handle_callback("github", GOOD_CODE, "state")
        .await
        .unwrap();

    assert_eq!(outcome.profile.user_uuid, None);
    assert!(!outcome.provider_token_stored);
    assert_eq!(store.cleanup_expired_tokens().await.unwrap(), 0);

    let claims = service.validate_jwt(&outcome.session_token).unwrap();
    assert_eq!(claims.user_uuid, None);
    assert_eq!(claims.email.as_deref(), Some(PROFILE_EMAIL));
}

#[tokio::test]
async fn test_callback_bad_code() {
    let base = spawn_mock_github().await;
    let service = create_service(auth_config(&base), StaticUserDirectory::new(), None);

    let err = service
        .handle_callback("github", "secret-bad-code", "state")
        .await
        .unwrap_err();

    match &err {
        AuthError::CodeExchange(msg) => {
            assert!(msg.contains("bad_verification_code"));
            assert!(!msg.contains("secret-bad-code"));
        }
        other => panic!("expected CodeExchange, got {:?}", other),
    }
}

#[tokio::test]
async fn test_callback_profile_failure() {
    let base = spawn_mock_github().await;
    let service = create_service(auth_config(&base), StaticUserDirectory::new(), None);

    let err = service
        .handle_callback("github", BROKEN_PROFILE_CODE, "state")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::ProfileFetch(_)));
}

#[tokio::test]
async fn test_callback_times_out() {
    let base = spawn_mock_github().await;
    let mut config = auth_config(&base);
    config.callback_timeout = Duration::from_millis(200);
    let service = create_service(config, StaticUserDirectory::new(), None);

    let started = std::time::Instant::now();
    let err = service
        .handle_callback("github", SLOW_CODE, "state")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UpstreamTimeout));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_http_timeout_reported_as_upstream_timeout() {
    let base = spawn_mock_github().await;
    let mut config = auth_config(&base);
    config.http_timeout = Duration::from_millis(200);
    let service = create_service(config, StaticUserDirectory::new(), None);

    let err = service
        .handle_callback("github", SLOW_CODE, "state")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UpstreamTimeout));
}

#[tokio::test]
async fn test_unreachable_provider() {
    // Nothing listens on the discard port
    let service = create_service(
        auth_config("http://127.0.0.1:9"),
        StaticUserDirectory::new(),
        None,
    );

    let err = service
        .handle_callback("github", GOOD_CODE, "state")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::CodeExchange(_)));
}
