//! In-memory cache store.

use crate::{errors::*, store::CacheStore};
use async_trait::async_trait;
use std::{
    collections::{BTreeSet, HashMap},
    ops::Bound,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, trace};

/// Longest lifetime an entry can be given; longer TTLs are clamped
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

// Map and ordered key index live under one lock so they never disagree.
#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    index: BTreeSet<String>,
}

impl Entries {
    fn remove(&mut self, key: &str) -> bool {
        self.index.remove(key);
        self.map.remove(key).is_some()
    }
}

/// Thread-safe in-process cache with per-entry expiry
///
/// Expired entries are filtered on every read and reclaimed by the task
/// started with [`InMemoryCache::spawn_sweeper`].
#[derive(Debug)]
pub struct InMemoryCache {
    inner: RwLock<Entries>,
    default_ttl: Duration,
}

impl InMemoryCache {
    /// Create an empty cache; `default_ttl` applies to `set` calls with a
    /// zero TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Entries::default()),
            default_ttl,
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut guard = self.inner.write().await;

        let expired: Vec<String> = guard
            .map
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            guard.remove(key);
        }
        expired.len()
    }

    /// Start a background task purging expired entries every `interval`.
    ///
    /// The task holds only a weak reference and exits once the cache is
    /// dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    debug!("Cache dropped, sweeper exiting");
                    break;
                };
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Swept expired cache entries");
                }
            }
        })
    }

    fn expiry_for(&self, ttl: Duration) -> Instant {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        Instant::now() + ttl.min(MAX_ENTRY_TTL)
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let guard = self.inner.read().await;

        match guard.map.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => Ok(entry.value.clone()),
            _ => Err(CacheError::NotFound),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: self.expiry_for(ttl),
        };

        let mut guard = self.inner.write().await;
        guard.index.insert(key.to_string());
        guard.map.insert(key.to_string(), entry);
        trace!(key, "Cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.map.clear();
        guard.index.clear();
        Ok(())
    }

    async fn get_with_ttl(&self, key: &str) -> Option<(Vec<u8>, Duration)> {
        let guard = self.inner.read().await;
        let entry = guard.map.get(key)?;

        let remaining = entry.expires_at.checked_duration_since(Instant::now())?;
        if remaining.is_zero() {
            return None;
        }
        Some((entry.value.clone(), remaining))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let mut guard = self.inner.write().await;

        let matching: Vec<String> = guard
            .index
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &matching {
            guard.remove(key);
        }

        debug!(prefix, removed = matching.len(), "Cache prefix invalidated");
        Ok(matching.len())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }
}
