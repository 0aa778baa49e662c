//! Auth configuration.

use std::{collections::BTreeMap, fmt, time::Duration};
use zeroize::Zeroizing;

/// Minimum accepted length of the session signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Longest accepted session token lifetime
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(30 * 86_400);

/// Longest accepted provider token lifetime
pub const MAX_PROVIDER_TOKEN_TTL: Duration = Duration::from_secs(3650 * 86_400);

/// Credentials and endpoint overrides for one OAuth provider
#[derive(Clone)]
pub struct ProviderSettings {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: Zeroizing<String>,
    /// Base URL of a self-hosted or enterprise instance
    pub enterprise_base_url: Option<String>,
    /// Scopes replacing the provider defaults
    pub scopes: Option<Vec<String>>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("enterprise_base_url", &self.enterprise_base_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Settings for the auth service, immutable after startup
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    pub jwt_secret: Zeroizing<String>,
    /// Session token lifetime
    pub jwt_ttl: Duration,
    /// `iss` claim written and required on session tokens
    pub jwt_issuer: String,
    /// Base of the callback URL; `/<provider>/callback` is appended
    pub redirect_url: String,
    /// Lifetime assigned to stored provider tokens
    pub access_token_ttl: Duration,
    /// Deadline for the whole callback flow
    pub callback_timeout: Duration,
    /// Per-request timeout for provider HTTP calls
    pub http_timeout: Duration,
    /// Configured providers by name
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl AuthConfig {
    /// Callback URL for `provider`
    pub fn callback_url(&self, provider: &str) -> String {
        format!(
            "{}/{}/callback",
            self.redirect_url.trim_end_matches('/'),
            provider
        )
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl", &self.jwt_ttl)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("redirect_url", &self.redirect_url)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("callback_timeout", &self.callback_timeout)
            .field("http_timeout", &self.http_timeout)
            .field("providers", &self.providers)
            .finish()
    }
}
