//! Resolution of external profiles to internal users.

use crate::{errors::*, types::DirectoryUser};
use async_trait::async_trait;
use devportal_crypto::current_timestamp;
use devportal_storage::{
    column_families::{CF_USERS, CF_USERS_BY_EMAIL},
    BatchExt, Storage,
};
use std::{collections::HashMap, sync::Arc};
use tracing::info;
use uuid::Uuid;

/// Narrow capability the auth service needs from the user repository
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Internal id of the user registered under `email`, if any.
    /// Matching is case-insensitive.
    async fn resolve_uuid_by_email(&self, email: &str) -> Result<Option<Uuid>>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Fixed in-memory directory, mostly for tests and small deployments
#[derive(Debug, Default, Clone)]
pub struct StaticUserDirectory {
    by_email: HashMap<String, Uuid>,
}

impl StaticUserDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_user(mut self, email: &str, user_uuid: Uuid) -> Self {
        self.insert(email, user_uuid);
        self
    }

    /// Add or replace a user
    pub fn insert(&mut self, email: &str, user_uuid: Uuid) {
        self.by_email.insert(normalize_email(email), user_uuid);
    }
}

#[async_trait]
impl UserLookup for StaticUserDirectory {
    async fn resolve_uuid_by_email(&self, email: &str) -> Result<Option<Uuid>> {
        Ok(self.by_email.get(&normalize_email(email)).copied())
    }
}

/// Directory persisted in storage with an email index
pub struct StorageUserDirectory<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> StorageUserDirectory<S> {
    /// Create a directory over `storage`
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Register a user, or return the existing one for the email
    ///
    /// The user record and its email index are written in one batch.
    pub async fn register_user(
        &self,
        email: &str,
        display_name: Option<String>,
    ) -> Result<DirectoryUser> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Config(format!("Invalid user email: {:?}", email)));
        }

        if let Some(existing) = self.find_by_email(&email).await? {
            return Ok(existing);
        }

        let user = DirectoryUser {
            user_uuid: Uuid::new_v4(),
            email: email.clone(),
            display_name,
            created_at: current_timestamp(),
        };

        let mut batch = self.storage.batch();
        batch.put(CF_USERS, &user.user_uuid, &user)?;
        batch.put(CF_USERS_BY_EMAIL, &email, &user.user_uuid)?;
        batch.commit().await?;

        info!(user_uuid = %user.user_uuid, "Registered directory user");
        Ok(user)
    }

    /// Look up a user by id
    pub async fn get_user(&self, user_uuid: Uuid) -> Result<Option<DirectoryUser>> {
        Ok(self.storage.get(CF_USERS, &user_uuid).await?)
    }

    /// Look up a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<DirectoryUser>> {
        let id: Option<Uuid> = self
            .storage
            .get(CF_USERS_BY_EMAIL, &normalize_email(email))
            .await?;

        match id {
            Some(id) => self.get_user(id).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S: Storage> UserLookup for StorageUserDirectory<S> {
    async fn resolve_uuid_by_email(&self, email: &str) -> Result<Option<Uuid>> {
        Ok(self
            .storage
            .get(CF_USERS_BY_EMAIL, &normalize_email(email))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devportal_storage::RocksDbStorage;

    #[tokio::test]
    async fn test_static_directory_case_insensitive() {
        let id = Uuid::new_v4();
        let directory = StaticUserDirectory::new().with_user("Dev@Example.com", id);

        assert_eq!(
            directory
                .resolve_uuid_by_email("dev@example.COM")
                .await
                .unwrap(),
            Some(id)
        );
        assert_eq!(
            directory
                .resolve_uuid_by_email("other@example.com")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_storage_directory_register_and_resolve() {
        let storage = Arc::new(RocksDbStorage::open_test().unwrap());
        let directory = StorageUserDirectory::new(storage);

        let user = directory
            .register_user(" Dev@Example.com ", Some("Dev".to_string()))
            .await
            .unwrap();

        assert_eq!(user.email, "dev@example.com");
        assert_eq!(
            directory
                .resolve_uuid_by_email("DEV@example.com")
                .await
                .unwrap(),
            Some(user.user_uuid)
        );
        assert_eq!(
            directory.get_user(user.user_uuid).await.unwrap(),
            Some(user.clone())
        );
    }

    #[tokio::test]
    async fn test_register_is_idempotent_per_email() {
        let storage = Arc::new(RocksDbStorage::open_test().unwrap());
        let directory = StorageUserDirectory::new(storage);

        let first = directory.register_user("a@example.com", None).await.unwrap();
        let second = directory
            .register_user("A@example.com", Some("ignored".to_string()))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let storage = Arc::new(RocksDbStorage::open_test().unwrap());
        let directory = StorageUserDirectory::new(storage);

        assert!(directory.register_user("not-an-email", None).await.is_err());
    }
}
