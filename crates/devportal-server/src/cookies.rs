//! Session and OAuth state cookies.

use axum::http::{header, HeaderMap};
use std::time::Duration;

/// Cookie carrying the session JWT
pub const SESSION_COOKIE: &str = "auth_token";

/// Cookie binding an OAuth login to the browser that started it
pub const STATE_COOKIE: &str = "oauth_state";

/// Lifetime of the OAuth state cookie
pub const STATE_COOKIE_MAX_AGE: Duration = Duration::from_secs(600);

const STATE_COOKIE_PATH: &str = "/v1/auth";

/// Value of cookie `name`, if present
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Session credential, preferring the header over the cookie
pub fn session_credential(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| cookie_value(headers, SESSION_COOKIE))
}

/// `Set-Cookie` value issuing the session cookie
pub fn session_cookie(token: &str, max_age: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.as_secs()
    )
}

/// `Set-Cookie` value clearing the session cookie
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; Secure; Path=/; SameSite=Lax; Max-Age=-1",
        SESSION_COOKIE
    )
}

/// `Set-Cookie` value holding the OAuth state for the callback
pub fn state_cookie(state: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; Path={}; SameSite=Lax; Max-Age={}",
        STATE_COOKIE,
        state,
        STATE_COOKIE_PATH,
        STATE_COOKIE_MAX_AGE.as_secs()
    )
}

/// `Set-Cookie` value clearing the OAuth state
pub fn clear_state_cookie() -> String {
    format!(
        "{}=; HttpOnly; Secure; Path={}; SameSite=Lax; Max-Age=-1",
        STATE_COOKIE, STATE_COOKIE_PATH
    )
}
