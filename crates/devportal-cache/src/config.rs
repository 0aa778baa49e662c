//! Cache configuration and store selection.

use crate::{disabled::DisabledCache, memory::InMemoryCache, store::CacheStore};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Cache settings resolved at startup
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether values are retained at all
    pub enabled: bool,
    /// TTL applied to writes that pass a zero TTL
    pub default_ttl: Duration,
    /// Cadence of the expired-entry sweep
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Build the configured store.
///
/// An enabled cache gets its sweeper spawned on the current tokio runtime,
/// so this must be called from within one.
pub fn create_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    if !config.enabled {
        info!("Response cache disabled");
        return Arc::new(DisabledCache);
    }

    let cache = Arc::new(InMemoryCache::new(config.default_ttl));
    cache.spawn_sweeper(config.sweep_interval);

    info!(
        default_ttl_secs = config.default_ttl.as_secs(),
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Response cache enabled"
    );
    cache
}
