//! Cache store trait.

use crate::errors::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Expiring key → bytes storage
///
/// The payload is opaque; callers own serialization. Implementations are
/// shared across request handlers and must tolerate concurrent readers and
/// writers. Racing writes to one key are last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a live value.
    ///
    /// Fails with [`CacheError::NotFound`](crate::CacheError::NotFound) when
    /// the key is absent or expired, and with
    /// [`CacheError::Disabled`](crate::CacheError::Disabled) on a disabled
    /// store. Expired entries are never returned, whether or not a sweep has
    /// run.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Store a value for `ttl`; a zero `ttl` means the configured default.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Remove one entry
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every entry
    async fn clear(&self) -> Result<()>;

    /// Non-failing lookup returning the value and its remaining lifetime
    async fn get_with_ttl(&self, key: &str) -> Option<(Vec<u8>, Duration)>;

    /// Remove every entry whose key starts with `prefix`, returning how many
    /// were removed
    async fn delete_prefix(&self, prefix: &str) -> Result<usize>;

    /// Number of stored entries, including expired ones not yet swept
    async fn len(&self) -> usize;

    /// Whether the store is empty
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether this store actually retains values
    fn is_enabled(&self) -> bool {
        true
    }
}
