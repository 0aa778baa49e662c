//! Resolved OAuth endpoint configuration.

use zeroize::Zeroizing;

/// Everything needed to drive one provider's authorization-code flow
#[derive(Clone)]
pub struct OAuthConfig {
    /// Provider name as used in routes
    pub provider: String,
    /// Client ID
    pub client_id: String,
    /// Client secret
    pub client_secret: Zeroizing<String>,
    /// Authorization endpoint
    pub auth_url: String,
    /// Token exchange endpoint
    pub token_url: String,
    /// User profile endpoint
    pub user_info_url: String,
    /// Endpoint listing the user's emails, for providers that hide them
    pub emails_url: Option<String>,
    /// Redirect URI registered with the provider
    pub redirect_uri: String,
    /// Scopes to request
    pub scopes: Vec<String>,
    /// Provider-specific authorization parameters
    pub extra_auth_params: Vec<(String, String)>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("provider", &self.provider)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("user_info_url", &self.user_info_url)
            .field("emails_url", &self.emails_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}
