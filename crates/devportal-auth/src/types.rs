//! Auth data types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a session JWT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Provider login of the user
    pub username: String,
    /// Email reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Internal user id, absent when the email matched no known user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_uuid: Option<Uuid>,
    /// Issuer
    pub iss: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// User profile returned by a provider, normalized across providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    /// Provider-side account id
    pub id: String,
    /// Login or nickname
    pub login: String,
    /// Primary email
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Internal user id, attached after directory lookup
    pub user_uuid: Option<Uuid>,
}

/// Token endpoint response
///
/// Providers disagree on field casing, so both spellings are accepted.
/// Error responses delivered with a 200 status carry `error` instead of a
/// token.
#[derive(Clone, Default, Deserialize)]
pub struct OAuthTokenResponse {
    /// Provider access token
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
    /// Token type, usually `bearer`
    #[serde(default, alias = "tokenType")]
    pub token_type: Option<String>,
    /// Lifetime in seconds, when the provider reports one
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<u64>,
    /// Granted scopes
    #[serde(default)]
    pub scope: Option<String>,
    /// Refresh token, when issued
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    /// OAuth error code
    #[serde(default)]
    pub error: Option<String>,
    /// OAuth error description
    #[serde(default, alias = "errorDescription")]
    pub error_description: Option<String>,
}

impl std::fmt::Debug for OAuthTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokenResponse")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("error", &self.error)
            .finish()
    }
}

/// Result of a completed callback
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    /// Provider the user signed in with
    pub provider: String,
    /// Freshly issued session JWT
    pub session_token: String,
    /// Session lifetime in seconds
    pub expires_in: u64,
    /// Scopes granted by the provider
    pub scope: Option<String>,
    /// Profile with the resolved internal id, if any
    pub profile: ExternalProfile,
    /// Whether the provider token was stored for later hand-off
    pub provider_token_stored: bool,
}

/// Profile section of the message posted to the opener window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackProfile {
    /// Provider login
    pub login: String,
    /// Email
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
}

/// Canonical payload relayed to the browser after a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    /// Session JWT
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Session lifetime in seconds
    pub expires_in_seconds: u64,
    /// Scopes granted by the provider
    pub scope: Option<String>,
    /// Normalized profile
    pub profile: CallbackProfile,
}

impl From<&CallbackOutcome> for CallbackPayload {
    fn from(outcome: &CallbackOutcome) -> Self {
        Self {
            access_token: outcome.session_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in_seconds: outcome.expires_in,
            scope: outcome.scope.clone(),
            profile: CallbackProfile {
                login: outcome.profile.login.clone(),
                email: outcome.profile.email.clone(),
                name: outcome.profile.name.clone(),
                avatar_url: outcome.profile.avatar_url.clone(),
            },
        }
    }
}

/// A decrypted, unexpired provider token
#[derive(Clone)]
pub struct ProviderToken {
    /// Owner
    pub user_uuid: Uuid,
    /// Provider name
    pub provider: String,
    /// Plaintext access token
    pub access_token: zeroize::Zeroizing<String>,
    /// Expiry (unix seconds)
    pub expires_at: u64,
}

impl std::fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderToken")
            .field("user_uuid", &self.user_uuid)
            .field("provider", &self.provider)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// User known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Internal id
    pub user_uuid: Uuid,
    /// Lowercased email
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Registration time (unix seconds)
    pub created_at: u64,
}
