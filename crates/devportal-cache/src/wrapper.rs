//! Get-or-set orchestration on top of a [`CacheStore`].

use crate::{errors::*, store::CacheStore};
use serde::{de::DeserializeOwned, Serialize};
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{debug, warn};

/// Turns "check the cache, else compute and populate" into one call.
///
/// Payloads are stored as JSON. A cached payload that no longer
/// deserializes is logged, evicted and treated as a miss; it never reaches
/// the caller as an error.
///
/// Concurrent misses on the same key are not coalesced: each caller runs
/// its own fetch and the last write wins.
#[derive(Clone)]
pub struct CacheWrapper {
    store: Arc<dyn CacheStore>,
}

impl CacheWrapper {
    /// Wrap a store
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Return the cached `T` under `key`, or run `fetch` once, cache its
    /// result for `ttl` and return it.
    ///
    /// A failing `fetch` surfaces as [`CacheError::Fetch`] carrying the
    /// original error as its source, and nothing is written.
    pub async fn get_or_set<T, F, Fut, E>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<FetchError>,
    {
        if let Some(bytes) = self.lookup(key).await {
            match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    debug!(key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => self.evict_corrupt(key, &e).await,
            }
        }

        debug!(key, "Cache miss");
        let value = fetch().await.map_err(|e| CacheError::Fetch(e.into()))?;

        let bytes =
            serde_json::to_vec(&value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.store_value(key, bytes, ttl).await;

        Ok(value)
    }

    /// Raw variant of [`CacheWrapper::get_or_set`] for callers that already
    /// hold serialized JSON.
    ///
    /// Cached bytes must still parse as JSON to count as a hit.
    pub async fn get_or_set_raw<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<u8>, E>>,
        E: Into<FetchError>,
    {
        if let Some(bytes) = self.lookup(key).await {
            match serde_json::from_slice::<serde::de::IgnoredAny>(&bytes) {
                Ok(_) => {
                    debug!(key, "Cache hit");
                    return Ok(bytes);
                }
                Err(e) => self.evict_corrupt(key, &e).await,
            }
        }

        debug!(key, "Cache miss");
        let bytes = fetch().await.map_err(|e| CacheError::Fetch(e.into()))?;
        self.store_value(key, bytes.clone(), ttl).await;

        Ok(bytes)
    }

    /// Drop one key
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.store.delete(key).await
    }

    /// Drop every key under `prefix`, returning how many were removed
    pub async fn invalidate_prefix(&self, prefix: &str) -> Result<usize> {
        self.store.delete_prefix(prefix).await
    }

    async fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        match self.store.get(key).await {
            Ok(bytes) => Some(bytes),
            Err(CacheError::NotFound) | Err(CacheError::Disabled) => None,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn evict_corrupt(&self, key: &str, error: &serde_json::Error) {
        warn!(key, error = %error, "Corrupt cache entry, treating as miss");
        if let Err(e) = self.store.delete(key).await {
            warn!(key, error = %e, "Failed to evict corrupt cache entry");
        }
    }

    async fn store_value(&self, key: &str, bytes: Vec<u8>, ttl: Duration) {
        if !self.store.is_enabled() {
            return;
        }
        if let Err(e) = self.store.set(key, bytes, ttl).await {
            warn!(key, error = %e, "Failed to populate cache");
        }
    }
}

impl std::fmt::Debug for CacheWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheWrapper")
            .field("enabled", &self.store.is_enabled())
            .finish()
    }
}
