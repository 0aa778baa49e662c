//! Atlassian (Jira Cloud) 3LO provider.

use crate::oauth::providers::Provider;

const ATLASSIAN_AUTH: &str = "https://auth.atlassian.com";
const ATLASSIAN_API: &str = "https://api.atlassian.com";

/// Atlassian OAuth 2.0 (3LO) provider
#[derive(Debug, Clone, Default)]
pub struct AtlassianProvider {
    base_url: Option<String>,
}

impl AtlassianProvider {
    /// Create a provider; a base URL replaces both the auth and API hosts
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }
}

impl Provider for AtlassianProvider {
    fn name(&self) -> &'static str {
        "atlassian"
    }

    fn auth_url(&self) -> String {
        format!(
            "{}/authorize",
            self.base_url.as_deref().unwrap_or(ATLASSIAN_AUTH)
        )
    }

    fn token_url(&self) -> String {
        format!(
            "{}/oauth/token",
            self.base_url.as_deref().unwrap_or(ATLASSIAN_AUTH)
        )
    }

    fn user_info_url(&self) -> String {
        format!("{}/me", self.base_url.as_deref().unwrap_or(ATLASSIAN_API))
    }

    fn scopes(&self) -> &[&str] {
        &["read:me", "read:jira-work", "read:jira-user", "offline_access"]
    }

    fn extra_auth_params(&self) -> Vec<(String, String)> {
        vec![
            ("audience".to_string(), "api.atlassian.com".to_string()),
            ("prompt".to_string(), "consent".to_string()),
        ]
    }
}
