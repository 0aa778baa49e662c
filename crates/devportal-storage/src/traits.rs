//! Storage trait definitions.

use crate::errors::{Result, StorageError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Key-value storage over named column families
///
/// Keys and values are serialized with bincode. Implementations must be
/// safe to share between request handlers and background tasks.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get a value by key from a column family
    ///
    /// Returns `Ok(None)` when the key does not exist.
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned;

    /// Put a key-value pair into a column family, replacing any prior value
    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync;

    /// Delete a key from a column family
    ///
    /// Deleting a missing key is not an error.
    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync;

    /// Read every value of a column family in key order
    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<V>>
    where
        V: DeserializeOwned + Send;

    /// Create a new batch for atomic multi-key writes
    fn batch(&self) -> Box<dyn Batch>;
}

/// Batch of writes applied atomically on commit
///
/// Works with pre-serialized bytes to stay object safe; use [`BatchExt`]
/// for typed keys and values. Dropping an uncommitted batch discards it.
#[async_trait]
pub trait Batch: Send {
    /// Put a pre-serialized key-value pair in the batch
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    /// Commit the batch atomically
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Typed helpers over [`Batch`]
pub trait BatchExt: Batch {
    /// Put a key-value pair in the batch
    fn put<K, V>(&mut self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        self.put_raw(cf, encode(key)?, encode(value)?)
    }
}

impl<T: Batch + ?Sized> BatchExt for T {}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(StorageError::Encode)
}

pub(crate) fn decode<V: DeserializeOwned>(cf: &str, bytes: &[u8]) -> Result<V> {
    bincode::deserialize(bytes).map_err(|source| StorageError::Decode {
        cf: cf.to_string(),
        source,
    })
}
