//! Encrypted custody of provider access tokens.

use crate::{errors::*, types::ProviderToken};
use devportal_crypto::{current_timestamp, hash_for_log, CipherContext};
use devportal_storage::{column_families::CF_PROVIDER_TOKENS, Storage};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Persisted form of a provider token; the token itself is only ever
/// stored encrypted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProviderToken {
    /// Owner
    pub user_uuid: Uuid,
    /// Provider name
    pub provider: String,
    /// `enc:v1:` ciphertext of the access token
    pub token_ciphertext: String,
    /// Expiry (unix seconds)
    pub expires_at: u64,
    /// Last write (unix seconds)
    pub updated_at: u64,
}

impl StoredProviderToken {
    fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// One live token per (user, provider), encrypted at rest
pub struct ProviderTokenStore<S: Storage> {
    storage: Arc<S>,
    cipher: Arc<CipherContext>,
    // Serializes writes with cleanup's check-then-delete
    write_lock: Mutex<()>,
}

impl<S: Storage + 'static> ProviderTokenStore<S> {
    /// Create a store over `storage`, sealing tokens with `cipher`
    pub fn new(storage: Arc<S>, cipher: Arc<CipherContext>) -> Self {
        Self {
            storage,
            cipher,
            write_lock: Mutex::new(()),
        }
    }

    fn key(user_uuid: Uuid, provider: &str) -> (Uuid, String) {
        (user_uuid, provider.to_string())
    }

    /// Encrypt and store `token`, replacing any previous token for the pair
    pub async fn upsert_token(
        &self,
        user_uuid: Uuid,
        provider: &str,
        token: &str,
        expires_at: u64,
    ) -> Result<()> {
        let record = StoredProviderToken {
            user_uuid,
            provider: provider.to_string(),
            token_ciphertext: self.cipher.encrypt(token)?,
            expires_at,
            updated_at: current_timestamp(),
        };

        let _guard = self.write_lock.lock().await;
        self.storage
            .put(CF_PROVIDER_TOKENS, &Self::key(user_uuid, provider), &record)
            .await?;

        debug!(
            user = %hash_for_log(&user_uuid.to_string()),
            provider,
            expires_at,
            "Stored provider token"
        );
        Ok(())
    }

    /// Return the decrypted token if one exists and has not expired
    ///
    /// Expired records read as absent whether or not cleanup has removed
    /// them. A record that fails to decrypt is an error, never a token.
    pub async fn get_valid_token(
        &self,
        user_uuid: Uuid,
        provider: &str,
    ) -> Result<Option<ProviderToken>> {
        let record: Option<StoredProviderToken> = self
            .storage
            .get(CF_PROVIDER_TOKENS, &Self::key(user_uuid, provider))
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        if record.is_expired(current_timestamp()) {
            debug!(provider, "Provider token expired");
            return Ok(None);
        }

        let access_token = Zeroizing::new(self.cipher.decrypt(&record.token_ciphertext)?);

        Ok(Some(ProviderToken {
            user_uuid,
            provider: record.provider,
            access_token,
            expires_at: record.expires_at,
        }))
    }

    /// Remove the token for the pair, if any
    pub async fn delete_token(&self, user_uuid: Uuid, provider: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.storage
            .delete(CF_PROVIDER_TOKENS, &Self::key(user_uuid, provider))
            .await?;
        Ok(())
    }

    /// Delete every expired record, returning how many were removed
    ///
    /// Each candidate is re-read under the write lock before deletion, so a
    /// token replaced after the scan is kept.
    pub async fn cleanup_expired_tokens(&self) -> Result<usize> {
        let now = current_timestamp();
        let records: Vec<StoredProviderToken> = self.storage.scan_all(CF_PROVIDER_TOKENS).await?;

        let mut removed = 0;
        for candidate in records.into_iter().filter(|r| r.is_expired(now)) {
            let key = Self::key(candidate.user_uuid, &candidate.provider);

            let _guard = self.write_lock.lock().await;
            let current: Option<StoredProviderToken> =
                self.storage.get(CF_PROVIDER_TOKENS, &key).await?;

            match current {
                Some(record) if record.is_expired(current_timestamp()) => {
                    self.storage.delete(CF_PROVIDER_TOKENS, &key).await?;
                    removed += 1;
                }
                Some(_) => debug!(
                    provider = %candidate.provider,
                    "Provider token replaced during cleanup, keeping it"
                ),
                None => {}
            }
        }

        Ok(removed)
    }

    /// Run [`cleanup_expired_tokens`](Self::cleanup_expired_tokens) every
    /// `interval` until the store is dropped
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(store) = weak.upgrade() else {
                    break;
                };
                match store.cleanup_expired_tokens().await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "Removed expired provider tokens"),
                    Err(e) => warn!(error = %e, "Provider token cleanup failed"),
                }
            }
        })
    }
}
