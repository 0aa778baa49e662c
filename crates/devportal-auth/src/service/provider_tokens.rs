//! Provider token hand-off to downstream integrations.

use crate::{errors::*, user_lookup::UserLookup};
use devportal_storage::Storage;
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::AuthService;

impl<S: Storage + 'static, U: UserLookup> AuthService<S, U> {
    /// Usable provider access token for `user_id`
    ///
    /// This is the only path by which API clients obtain provider
    /// credentials. Missing and expired tokens both yield
    /// [`AuthError::NoValidToken`].
    pub async fn get_provider_access_token(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Zeroizing<String>> {
        let store = self.require_token_store()?;
        let user_uuid =
            Uuid::parse_str(user_id).map_err(|_| AuthError::InvalidUserId(user_id.to_string()))?;

        store
            .get_valid_token(user_uuid, provider)
            .await?
            .map(|token| token.access_token)
            .ok_or_else(|| AuthError::NoValidToken {
                provider: provider.to_string(),
            })
    }

    /// Expiry of the user's usable provider token, if there is one
    pub async fn provider_token_expiry(
        &self,
        user_uuid: Uuid,
        provider: &str,
    ) -> Result<Option<u64>> {
        self.provider_config(provider)?;
        let store = self.require_token_store()?;

        Ok(store
            .get_valid_token(user_uuid, provider)
            .await?
            .map(|token| token.expires_at))
    }

    /// Forget the user's stored token for `provider`
    pub async fn disconnect_provider(&self, user_uuid: Uuid, provider: &str) -> Result<()> {
        self.provider_config(provider)?;
        let store = self.require_token_store()?;

        store.delete_token(user_uuid, provider).await?;
        info!(user_uuid = %user_uuid, provider, "Disconnected provider");
        Ok(())
    }
}
