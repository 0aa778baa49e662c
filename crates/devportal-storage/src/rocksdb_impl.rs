//! RocksDB storage implementation.

use crate::{
    column_families::all_column_families,
    errors::{Result, StorageError},
    traits::{decode, encode, Batch, Storage},
};
use async_trait::async_trait;
use rocksdb::{IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, sync::Arc};
use tracing::debug;

/// RocksDB storage implementation
pub struct RocksDbStorage {
    db: Arc<DB>,
    // Held so throwaway databases outlive their handle.
    #[cfg(any(test, feature = "test-util"))]
    _temp_dir: Option<tempfile::TempDir>,
}

impl RocksDbStorage {
    /// Open the database at `path`, creating it and any missing column
    /// families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Self::open_db(path.as_ref())?;
        debug!(path = ?path.as_ref(), "Opened RocksDB");

        Ok(Self {
            db: Arc::new(db),
            #[cfg(any(test, feature = "test-util"))]
            _temp_dir: None,
        })
    }

    /// Open a database in a fresh temporary directory
    ///
    /// The directory is removed when the storage is dropped. Enabled for
    /// other crates' tests by the `test-util` feature.
    #[cfg(any(test, feature = "test-util"))]
    pub fn open_test() -> Result<Self> {
        let temp_dir = tempfile::TempDir::new()?;
        let db = Self::open_db(temp_dir.path())?;

        Ok(Self {
            db: Arc::new(db),
            _temp_dir: Some(temp_dir),
        })
    }

    fn open_db(path: &Path) -> Result<DB> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        DB::open_cf(&opts, path, all_column_families()).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })
    }

    fn cf_handle(&self, cf: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(cf)
            .ok_or_else(|| StorageError::UnknownColumnFamily(cf.to_string()))
    }
}

#[async_trait]
impl Storage for RocksDbStorage {
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let cf_handle = self.cf_handle(cf)?;
        let key_bytes = encode(key)?;

        match self.db.get_cf(cf_handle, &key_bytes)? {
            Some(bytes) => Ok(Some(decode(cf, &bytes)?)),
            None => Ok(None),
        }
    }

    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let cf_handle = self.cf_handle(cf)?;
        self.db.put_cf(cf_handle, encode(key)?, encode(value)?)?;
        Ok(())
    }

    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync,
    {
        let cf_handle = self.cf_handle(cf)?;
        self.db.delete_cf(cf_handle, encode(key)?)?;
        Ok(())
    }

    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<V>>
    where
        V: DeserializeOwned + Send,
    {
        let cf_handle = self.cf_handle(cf)?;

        let mut results = Vec::new();
        for item in self.db.iterator_cf(cf_handle, IteratorMode::Start) {
            let (_, value) = item?;
            results.push(decode(cf, &value)?);
        }

        Ok(results)
    }

    fn batch(&self) -> Box<dyn Batch> {
        Box::new(RocksDbBatch {
            db: Arc::clone(&self.db),
            write_batch: WriteBatch::default(),
        })
    }
}

/// RocksDB batch implementation
pub struct RocksDbBatch {
    db: Arc<DB>,
    write_batch: WriteBatch,
}

#[async_trait]
impl Batch for RocksDbBatch {
    fn put_raw(&mut self, cf: &str, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        let cf_handle = self
            .db
            .cf_handle(cf)
            .ok_or_else(|| StorageError::UnknownColumnFamily(cf.to_string()))?;
        self.write_batch.put_cf(cf_handle, &key, &value);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let count = self.write_batch.len();
        self.db.write(self.write_batch)?;

        debug!(operations = count, "Batch committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        column_families::{CF_PROVIDER_TOKENS, CF_USERS, CF_USERS_BY_EMAIL},
        traits::BatchExt,
    };
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Record {
        owner: Uuid,
        label: String,
        expires_at: u64,
    }

    fn record(owner: Uuid, label: &str) -> Record {
        Record {
            owner,
            label: label.to_string(),
            expires_at: 42,
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let storage = RocksDbStorage::open_test().unwrap();
        let owner = Uuid::new_v4();
        let key = (owner, "github".to_string());

        storage
            .put(CF_PROVIDER_TOKENS, &key, &record(owner, "a"))
            .await
            .unwrap();

        let result: Option<Record> = storage.get(CF_PROVIDER_TOKENS, &key).await.unwrap();
        assert_eq!(result, Some(record(owner, "a")));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let storage = RocksDbStorage::open_test().unwrap();
        let owner = Uuid::new_v4();
        let key = (owner, "github".to_string());

        storage
            .put(CF_PROVIDER_TOKENS, &key, &record(owner, "first"))
            .await
            .unwrap();
        storage
            .put(CF_PROVIDER_TOKENS, &key, &record(owner, "second"))
            .await
            .unwrap();

        let result: Option<Record> = storage.get(CF_PROVIDER_TOKENS, &key).await.unwrap();
        assert_eq!(result.unwrap().label, "second");
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let storage = RocksDbStorage::open_test().unwrap();

        let result: Option<Record> = storage.get(CF_USERS, &Uuid::new_v4()).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = RocksDbStorage::open_test().unwrap();
        let id = Uuid::new_v4();

        storage.put(CF_USERS, &id, &record(id, "u")).await.unwrap();
        storage.delete(CF_USERS, &id).await.unwrap();

        let result: Option<Record> = storage.get(CF_USERS, &id).await.unwrap();
        assert_eq!(result, None);

        // Deleting again is fine
        storage.delete(CF_USERS, &id).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_column_family() {
        let storage = RocksDbStorage::open_test().unwrap();

        let result: Result<Option<Record>> = storage.get("nope", &1u32).await;
        assert!(matches!(result, Err(StorageError::UnknownColumnFamily(_))));
    }

    #[tokio::test]
    async fn test_wrong_type_is_decode_error() {
        let storage = RocksDbStorage::open_test().unwrap();
        let id = Uuid::new_v4();

        storage.put(CF_USERS, &id, &7u8).await.unwrap();

        let result: Result<Option<Record>> = storage.get(CF_USERS, &id).await;
        match result {
            Err(StorageError::Decode { cf, .. }) => assert_eq!(cf, CF_USERS),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_batch_commit() {
        let storage = RocksDbStorage::open_test().unwrap();
        let id = Uuid::new_v4();

        let mut batch = storage.batch();
        batch.put(CF_USERS, &id, &record(id, "user")).unwrap();
        batch
            .put(CF_USERS_BY_EMAIL, &"dev@example.com".to_string(), &id)
            .unwrap();
        batch.commit().await.unwrap();

        let user: Option<Record> = storage.get(CF_USERS, &id).await.unwrap();
        let indexed: Option<Uuid> = storage
            .get(CF_USERS_BY_EMAIL, &"dev@example.com".to_string())
            .await
            .unwrap();

        assert!(user.is_some());
        assert_eq!(indexed, Some(id));
    }

    #[tokio::test]
    async fn test_dropped_batch_writes_nothing() {
        let storage = RocksDbStorage::open_test().unwrap();
        let id = Uuid::new_v4();

        let mut batch = storage.batch();
        batch.put(CF_USERS, &id, &record(id, "user")).unwrap();
        drop(batch);

        let result: Option<Record> = storage.get(CF_USERS, &id).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_scan_all() {
        let storage = RocksDbStorage::open_test().unwrap();
        let owner = Uuid::new_v4();

        for provider in ["github", "atlassian"] {
            storage
                .put(
                    CF_PROVIDER_TOKENS,
                    &(owner, provider.to_string()),
                    &record(owner, provider),
                )
                .await
                .unwrap();
        }
        storage
            .put(CF_USERS, &owner, &record(owner, "user"))
            .await
            .unwrap();

        let mut labels: Vec<String> = storage
            .scan_all::<Record>(CF_PROVIDER_TOKENS)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.label)
            .collect();
        labels.sort();

        assert_eq!(labels, vec!["atlassian", "github"]);
    }

    #[tokio::test]
    async fn test_reopen_persists() {
        let dir = TempDir::new().unwrap();
        let id = Uuid::new_v4();

        {
            let storage = RocksDbStorage::open(dir.path()).unwrap();
            storage.put(CF_USERS, &id, &record(id, "kept")).await.unwrap();
        }

        let storage = RocksDbStorage::open(dir.path()).unwrap();
        let result: Option<Record> = storage.get(CF_USERS, &id).await.unwrap();
        assert_eq!(result.unwrap().label, "kept");
    }
}
