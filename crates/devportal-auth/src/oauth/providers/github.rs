//! GitHub and GitHub Enterprise provider.

use crate::oauth::providers::Provider;

const GITHUB_WEB: &str = "https://github.com";
const GITHUB_API: &str = "https://api.github.com";

/// GitHub OAuth app provider
///
/// With a base URL the endpoints point at a GitHub Enterprise Server
/// instance, whose REST API lives under `/api/v3`.
#[derive(Debug, Clone, Default)]
pub struct GitHubProvider {
    base_url: Option<String>,
}

impl GitHubProvider {
    /// Create a provider for github.com or an enterprise instance
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }

    fn web_base(&self) -> &str {
        self.base_url.as_deref().unwrap_or(GITHUB_WEB)
    }

    fn api_base(&self) -> String {
        match &self.base_url {
            Some(base) => format!("{}/api/v3", base),
            None => GITHUB_API.to_string(),
        }
    }
}

impl Provider for GitHubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn auth_url(&self) -> String {
        format!("{}/login/oauth/authorize", self.web_base())
    }

    fn token_url(&self) -> String {
        format!("{}/login/oauth/access_token", self.web_base())
    }

    fn user_info_url(&self) -> String {
        format!("{}/user", self.api_base())
    }

    fn emails_url(&self) -> Option<String> {
        Some(format!("{}/user/emails", self.api_base()))
    }

    fn scopes(&self) -> &[&str] {
        &["read:user", "user:email", "repo"]
    }
}
