//! Auth service composing providers, session tokens and token custody.

mod callback;
mod provider_tokens;
mod sessions;

use crate::{
    config::{AuthConfig, MAX_PROVIDER_TOKEN_TTL},
    errors::*,
    jwt::SessionSigner,
    oauth::{provider_for, OAuthClient, OAuthConfig},
    token_store::ProviderTokenStore,
    user_lookup::UserLookup,
};
use devportal_storage::Storage;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tracing::info;

/// Orchestrates OAuth login, session tokens and provider token hand-off
///
/// A callback moves through code exchange, profile fetch, user resolution,
/// token persistence and session issuance in that order; any failing step
/// aborts the rest.
pub struct AuthService<S: Storage, U: UserLookup> {
    providers: BTreeMap<String, OAuthConfig>,
    oauth_client: OAuthClient,
    signer: SessionSigner,
    users: Arc<U>,
    token_store: Option<Arc<ProviderTokenStore<S>>>,
    access_token_ttl: Duration,
    callback_timeout: Duration,
}

impl<S: Storage + 'static, U: UserLookup> AuthService<S, U> {
    /// Build the service from validated configuration
    ///
    /// Fails on a weak JWT secret, an out-of-range lifetime or an unsupported
    /// provider name. Without
    /// a token store, logins still succeed but provider tokens are not kept.
    pub fn new(
        config: AuthConfig,
        users: Arc<U>,
        token_store: Option<Arc<ProviderTokenStore<S>>>,
    ) -> Result<Self> {
        let signer = SessionSigner::new(
            config.jwt_secret.as_bytes(),
            config.jwt_issuer.clone(),
            config.jwt_ttl,
        )?;

        if config.access_token_ttl.as_secs() == 0 || config.access_token_ttl > MAX_PROVIDER_TOKEN_TTL
        {
            return Err(AuthError::Config(format!(
                "Provider token TTL must be between 1 and {} seconds",
                MAX_PROVIDER_TOKEN_TTL.as_secs()
            )));
        }

        let mut providers = BTreeMap::new();
        for (name, settings) in &config.providers {
            if settings.client_id.is_empty() || settings.client_secret.is_empty() {
                return Err(AuthError::Config(format!(
                    "Provider {} is missing client credentials",
                    name
                )));
            }
            let provider = provider_for(name, settings)?;
            let oauth_config = provider.build_config(settings, config.callback_url(name));
            providers.insert(name.clone(), oauth_config);
        }

        info!(
            providers = ?providers.keys().collect::<Vec<_>>(),
            token_store = token_store.is_some(),
            "Auth service initialized"
        );

        Ok(Self {
            providers,
            oauth_client: OAuthClient::new(config.http_timeout)?,
            signer,
            users,
            token_store,
            access_token_ttl: config.access_token_ttl,
            callback_timeout: config.callback_timeout,
        })
    }

    /// Names of configured providers
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Whether `provider` is configured
    pub fn is_configured(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    /// Session token lifetime
    pub fn session_ttl(&self) -> Duration {
        self.signer.ttl()
    }

    fn provider_config(&self, provider: &str) -> Result<&OAuthConfig> {
        self.providers
            .get(provider)
            .ok_or_else(|| AuthError::UnknownProvider(provider.to_string()))
    }

    fn require_token_store(&self) -> Result<&ProviderTokenStore<S>> {
        self.token_store
            .as_deref()
            .ok_or(AuthError::TokenStoreUnavailable)
    }
}
