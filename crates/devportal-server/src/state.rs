use anyhow::{Context, Result};
use axum::http::HeaderValue;
use devportal_auth::{AuthService, ProviderTokenStore, StorageUserDirectory};
use devportal_cache::{create_store, CacheWrapper};
use devportal_crypto::CipherContext;
use devportal_storage::RocksDbStorage;
use std::{sync::Arc, time::Duration};

use crate::config::Config;

/// User directory backing email resolution
pub type PortalDirectory = StorageUserDirectory<RocksDbStorage>;

/// Auth service as composed by the server
pub type PortalAuthService = AuthService<RocksDbStorage, PortalDirectory>;

/// Application state shared across all handlers
///
/// Building it initializes the auth service; there is no way to serve the
/// protected routes without one.
pub struct AppState {
    pub auth: Arc<PortalAuthService>,
    pub users: Arc<PortalDirectory>,
    pub cache: CacheWrapper,
    /// Target origin for callback `postMessage` and CORS
    pub frontend_origin: String,
    pub cors_origin: HeaderValue,
    /// Max-Age of the session cookie
    pub session_ttl: Duration,
}

impl AppState {
    /// Open storage, seed the directory and start background maintenance
    pub async fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(
            RocksDbStorage::open(&config.database_path)
                .with_context(|| format!("open database at {}", config.database_path.display()))?,
        );

        let cipher = Arc::new(
            CipherContext::from_base64_secret(&config.token_encryption_key)
                .context("TOKEN_ENCRYPTION_KEY must be base64 of exactly 32 bytes")?,
        );
        let token_store = Arc::new(ProviderTokenStore::new(storage.clone(), cipher));

        let users = Arc::new(StorageUserDirectory::new(storage));
        for seed in &config.users {
            users
                .register_user(&seed.email, seed.display_name.clone())
                .await
                .with_context(|| "seed user directory")?;
        }
        if !config.users.is_empty() {
            tracing::info!(count = config.users.len(), "Seeded user directory");
        }

        let session_ttl = config.auth.jwt_ttl;
        let auth = Arc::new(
            AuthService::new(config.auth, users.clone(), Some(token_store.clone()))
                .context("initialize auth service")?,
        );

        let cors_origin = HeaderValue::from_str(&config.frontend_origin)
            .with_context(|| format!("invalid FRONTEND_ORIGIN: {}", config.frontend_origin))?;

        token_store.spawn_cleanup(config.token_cleanup_interval);
        let cache = CacheWrapper::new(create_store(&config.cache));

        Ok(AppState {
            auth,
            users,
            cache,
            frontend_origin: config.frontend_origin,
            cors_origin,
            session_ttl,
        })
    }
}
