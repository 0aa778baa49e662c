//! Cache error types.

use thiserror::Error;

/// Boxed error produced by a caller's fetch closure
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Cache operation errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Key absent or expired
    #[error("Cache entry not found")]
    NotFound,

    /// Cache is configured off
    #[error("Cache is disabled")]
    Disabled,

    /// Value could not be serialized for storage
    #[error("Cache serialization error: {0}")]
    Serialization(String),

    /// The fetch closure of a get-or-set call failed; nothing was cached
    #[error("Fetch failed: {0}")]
    Fetch(#[source] FetchError),
}

impl CacheError {
    /// The fetch closure's original error, if this is a fetch failure
    pub fn fetch_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CacheError::Fetch(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
