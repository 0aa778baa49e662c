//! # devportal-cache
//!
//! In-process response cache that shields slow upstream integrations from
//! redundant calls.
//!
//! - [`CacheStore`]: expiring key → bytes storage, either [`InMemoryCache`]
//!   or the no-op [`DisabledCache`], picked once at startup
//! - [`CacheWrapper`]: check the cache, else fetch and populate
//! - [`CacheKey`]: deterministic keys of the form
//!   `namespace:segment:segment[:k=v&k=v]`
//!
//! The cache is single-instance and non-durable. A restart clears it.

#![warn(clippy::all)]

pub mod config;
pub mod disabled;
pub mod errors;
pub mod key;
pub mod memory;
pub mod store;
pub mod wrapper;

pub use config::{create_store, CacheConfig};
pub use disabled::DisabledCache;
pub use errors::{CacheError, Result};
pub use key::CacheKey;
pub use memory::{InMemoryCache, MAX_ENTRY_TTL};
pub use store::CacheStore;
pub use wrapper::CacheWrapper;
