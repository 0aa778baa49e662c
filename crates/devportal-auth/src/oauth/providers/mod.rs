//! OAuth provider implementations.

pub mod atlassian;
pub mod github;

pub use atlassian::AtlassianProvider;
pub use github::GitHubProvider;

use crate::{
    config::ProviderSettings,
    errors::{AuthError, Result},
    oauth::config::OAuthConfig,
};

/// Endpoint layout and defaults of an OAuth provider
pub trait Provider: Send + Sync {
    /// Provider name as used in routes and configuration
    fn name(&self) -> &'static str;

    /// Authorization URL
    fn auth_url(&self) -> String;

    /// Token exchange URL
    fn token_url(&self) -> String;

    /// User profile URL
    fn user_info_url(&self) -> String;

    /// Email listing URL, if profiles may omit the email
    fn emails_url(&self) -> Option<String> {
        None
    }

    /// Default scopes
    fn scopes(&self) -> &[&str];

    /// Extra query parameters for the authorization URL
    fn extra_auth_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Build the resolved OAuth config
    fn build_config(&self, settings: &ProviderSettings, redirect_uri: String) -> OAuthConfig {
        let scopes = settings
            .scopes
            .clone()
            .unwrap_or_else(|| self.scopes().iter().map(|s| s.to_string()).collect());

        OAuthConfig {
            provider: self.name().to_string(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            auth_url: self.auth_url(),
            token_url: self.token_url(),
            user_info_url: self.user_info_url(),
            emails_url: self.emails_url(),
            redirect_uri,
            scopes,
            extra_auth_params: self.extra_auth_params(),
        }
    }
}

/// Look up the provider implementation for a configured name
pub fn provider_for(name: &str, settings: &ProviderSettings) -> Result<Box<dyn Provider>> {
    let base_url = settings
        .enterprise_base_url
        .as_deref()
        .map(|url| url.trim_end_matches('/').to_string());

    match name {
        "github" => Ok(Box::new(GitHubProvider::new(base_url))),
        "atlassian" | "jira" => Ok(Box::new(AtlassianProvider::new(base_url))),
        other => Err(AuthError::Config(format!(
            "Unsupported OAuth provider: {}",
            other
        ))),
    }
}
