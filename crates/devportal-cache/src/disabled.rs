//! No-op cache store used when caching is configured off.

use crate::{errors::*, store::CacheStore};
use async_trait::async_trait;
use std::time::Duration;

/// Cache store that retains nothing
///
/// Reads fail with [`CacheError::Disabled`]; writes and deletes succeed
/// without effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

#[async_trait]
impl CacheStore for DisabledCache {
    async fn get(&self, _key: &str) -> Result<Vec<u8>> {
        Err(CacheError::Disabled)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn get_with_ttl(&self, _key: &str) -> Option<(Vec<u8>, Duration)> {
        None
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<usize> {
        Ok(0)
    }

    async fn len(&self) -> usize {
        0
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
