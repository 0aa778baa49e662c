//! Authorization URL construction and the OAuth callback flow.

use crate::{errors::*, types::*, user_lookup::UserLookup};
use devportal_crypto::{current_timestamp, hash_for_log};
use devportal_storage::Storage;
use tracing::{info, warn};

use super::AuthService;

impl<S: Storage + 'static, U: UserLookup> AuthService<S, U> {
    /// Authorization URL for `provider` carrying the anti-forgery `state`
    pub fn auth_url(&self, provider: &str, state: &str) -> Result<String> {
        let config = self.provider_config(provider)?;
        let url = self.oauth_client.build_auth_url(config, state)?;

        info!(
            provider,
            state_hash = %hash_for_log(state),
            "Built authorization URL"
        );
        Ok(url)
    }

    /// Complete a login from the provider redirect
    ///
    /// The whole flow is bounded by the configured callback timeout. The
    /// code and state never reach the logs in clear.
    pub async fn handle_callback(
        &self,
        provider: &str,
        code: &str,
        state: &str,
    ) -> Result<CallbackOutcome> {
        // Fail fast on unknown providers before any network work
        self.provider_config(provider)?;

        info!(
            provider,
            state_hash = %hash_for_log(state),
            code_hash = %hash_for_log(code),
            "Handling OAuth callback"
        );

        let outcome = tokio::time::timeout(
            self.callback_timeout,
            self.complete_callback(provider, code),
        )
        .await
        .map_err(|_| {
            warn!(provider, "OAuth callback timed out");
            AuthError::UpstreamTimeout
        })?;

        match &outcome {
            Ok(result) => info!(
                provider,
                linked = result.profile.user_uuid.is_some(),
                provider_token_stored = result.provider_token_stored,
                "OAuth login completed"
            ),
            Err(e) => warn!(provider, error = %e, "OAuth login failed"),
        }
        outcome
    }

    async fn complete_callback(&self, provider: &str, code: &str) -> Result<CallbackOutcome> {
        let config = self.provider_config(provider)?;

        let token_response = self.oauth_client.exchange_code(config, code).await?;
        let access_token = token_response
            .access_token
            .as_deref()
            .ok_or_else(|| AuthError::CodeExchange("Missing access token".to_string()))?;

        let mut profile = self.oauth_client.get_user_info(config, access_token).await?;

        profile.user_uuid = match &profile.email {
            Some(email) => self.users.resolve_uuid_by_email(email).await?,
            None => None,
        };

        let mut provider_token_stored = false;
        if let (Some(user_uuid), Some(store)) = (profile.user_uuid, self.token_store.as_ref()) {
            let expires_at = current_timestamp()
                .checked_add(self.access_token_ttl.as_secs())
                .ok_or_else(|| AuthError::Config("provider token TTL out of range".to_string()))?;
            store
                .upsert_token(user_uuid, provider, access_token, expires_at)
                .await?;
            provider_token_stored = true;
        }

        let session_token = self.generate_jwt(&profile)?;

        Ok(CallbackOutcome {
            provider: provider.to_string(),
            session_token,
            expires_in: self.session_ttl().as_secs(),
            scope: token_response.scope.clone(),
            profile,
            provider_token_stored,
        })
    }
}
