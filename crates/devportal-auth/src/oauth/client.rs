//! HTTP client for provider token and profile endpoints.

use crate::{
    errors::*,
    oauth::config::OAuthConfig,
    types::{ExternalProfile, OAuthTokenResponse},
};
use reqwest::{header::ACCEPT, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// OAuth client for provider interactions
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http_client: Client,
}

impl OAuthClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("devportal-auth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Build the provider authorization URL
    pub fn build_auth_url(&self, config: &OAuthConfig, state: &str) -> Result<String> {
        let mut url = Url::parse(&config.auth_url)
            .map_err(|e| AuthError::Config(format!("Invalid auth URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &config.client_id)
                .append_pair("redirect_uri", &config.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", &config.scopes.join(" "))
                .append_pair("state", state);

            for (name, value) in &config.extra_auth_params {
                query.append_pair(name, value);
            }
        }

        Ok(url.to_string())
    }

    /// Exchange an authorization code for a provider access token
    pub async fn exchange_code(
        &self,
        config: &OAuthConfig,
        code: &str,
    ) -> Result<OAuthTokenResponse> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&config.token_url)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| request_error(e, AuthError::CodeExchange))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            if status.is_success() {
                AuthError::CodeExchange(format!("Unreadable token response: {}", e.without_url()))
            } else {
                AuthError::CodeExchange(format!("Token endpoint returned {}", status))
            }
        })?;

        let token_response = OAuthTokenResponse::deserialize(&body)
            .map_err(|e| AuthError::CodeExchange(format!("Malformed token response: {}", e)))?;

        if !status.is_success() || token_response.error.is_some() {
            return Err(AuthError::CodeExchange(describe_oauth_error(
                status,
                &token_response,
            )));
        }

        match token_response.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token_response),
            _ => Err(AuthError::CodeExchange(
                "Token response missing access token".to_string(),
            )),
        }
    }

    /// Fetch and normalize the user's profile
    ///
    /// When the profile hides the email and the provider exposes an email
    /// listing, the primary verified address is looked up there.
    pub async fn get_user_info(
        &self,
        config: &OAuthConfig,
        access_token: &str,
    ) -> Result<ExternalProfile> {
        let json = self
            .get_json(&config.user_info_url, access_token)
            .await
            .map_err(|e| match e {
                FetchFailure::Timeout => AuthError::UpstreamTimeout,
                FetchFailure::Other(msg) => AuthError::ProfileFetch(msg),
            })?;

        let mut profile = normalize_profile(&json)?;

        if profile.email.is_none() {
            if let Some(emails_url) = &config.emails_url {
                match self.get_json(emails_url, access_token).await {
                    Ok(emails) => profile.email = primary_email(&emails),
                    Err(FetchFailure::Timeout) => return Err(AuthError::UpstreamTimeout),
                    Err(FetchFailure::Other(msg)) => {
                        warn!(provider = %config.provider, error = %msg, "Email lookup failed");
                    }
                }
            }
        }

        debug!(
            provider = %config.provider,
            has_email = profile.email.is_some(),
            "Fetched provider profile"
        );
        Ok(profile)
    }

    async fn get_json(
        &self,
        url: &str,
        access_token: &str,
    ) -> std::result::Result<Value, FetchFailure> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchFailure::Timeout
                } else {
                    FetchFailure::Other(format!("Request failed: {}", e.without_url()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Other(format!("Provider returned {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| FetchFailure::Other(format!("Unreadable response: {}", e.without_url())))
    }
}

enum FetchFailure {
    Timeout,
    Other(String),
}

fn request_error(e: reqwest::Error, wrap: fn(String) -> AuthError) -> AuthError {
    if e.is_timeout() {
        AuthError::UpstreamTimeout
    } else {
        wrap(format!("Request failed: {}", e.without_url()))
    }
}

fn describe_oauth_error(status: StatusCode, response: &OAuthTokenResponse) -> String {
    match (&response.error, &response.error_description) {
        (Some(error), Some(description)) => format!("{}: {}", error, description),
        (Some(error), None) => error.clone(),
        _ => format!("Token endpoint returned {}", status),
    }
}

fn str_field<'a>(json: &'a Value, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| json.get(*name).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

/// Normalize a provider profile document into an [`ExternalProfile`]
///
/// Field names differ between providers (`login` vs `nickname`,
/// `avatar_url` vs `picture`, numeric vs string ids).
pub(crate) fn normalize_profile(json: &Value) -> Result<ExternalProfile> {
    let id = match json.get("id") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => str_field(json, &["account_id", "accountId", "sub"]).map(str::to_string),
    }
    .ok_or_else(|| AuthError::ProfileFetch("Profile missing user id".to_string()))?;

    let email = str_field(json, &["email", "emailAddress"]).map(str::to_string);

    let login = str_field(json, &["login", "username", "nickname"])
        .map(str::to_string)
        .or_else(|| email.as_ref().and_then(|e| e.split('@').next().map(str::to_string)))
        .ok_or_else(|| AuthError::ProfileFetch("Profile missing login".to_string()))?;

    Ok(ExternalProfile {
        id,
        login,
        email,
        name: str_field(json, &["name", "display_name", "displayName"]).map(str::to_string),
        avatar_url: str_field(json, &["avatar_url", "avatarUrl", "picture", "avatar"])
            .map(str::to_string),
        user_uuid: None,
    })
}

fn primary_email(emails: &Value) -> Option<String> {
    let entries = emails.as_array()?;
    let verified = |entry: &&Value| entry.get("verified").and_then(Value::as_bool) == Some(true);
    let primary = |entry: &&Value| entry.get("primary").and_then(Value::as_bool) == Some(true);

    entries
        .iter()
        .filter(verified)
        .find(primary)
        .or_else(|| entries.iter().find(verified))
        .and_then(|entry| entry.get("email").and_then(Value::as_str))
        .map(str::to_string)
}
