//! Auth error types.

use devportal_crypto::CryptoError;
use devportal_storage::StorageError;
use thiserror::Error;

/// Errors from the auth subsystem
///
/// Messages never contain authorization codes, provider tokens or session
/// tokens, so they are safe to log and to relay to the browser.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid or missing configuration
    #[error("Auth configuration error: {0}")]
    Config(String),

    /// Provider name is not configured
    #[error("Unknown OAuth provider: {0}")]
    UnknownProvider(String),

    /// Token endpoint rejected or failed the code exchange
    #[error("OAuth code exchange failed: {0}")]
    CodeExchange(String),

    /// User profile could not be fetched from the provider
    #[error("Profile fetch failed: {0}")]
    ProfileFetch(String),

    /// Provider did not answer within the deadline
    #[error("OAuth provider timed out")]
    UpstreamTimeout,

    /// Session token failed signature, algorithm, issuer or expiry checks
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Session token could not be signed
    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    /// Provider token hand-off requested without a token store
    #[error("Token store is not configured")]
    TokenStoreUnavailable,

    /// User id could not be parsed as a UUID
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// No unexpired provider token exists for the user
    #[error("No valid {provider} token for user")]
    NoValidToken {
        /// Provider that was asked for
        provider: String,
    },

    /// Durable storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Encryption or decryption failure
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl AuthError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Config(_) => "AUTH_CONFIG",
            AuthError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            AuthError::CodeExchange(_) => "CODE_EXCHANGE_FAILED",
            AuthError::ProfileFetch(_) => "PROFILE_FETCH_FAILED",
            AuthError::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            AuthError::InvalidToken => "UNAUTHORIZED",
            AuthError::TokenSigning(_) => "TOKEN_SIGNING_FAILED",
            AuthError::TokenStoreUnavailable => "TOKEN_STORE_UNAVAILABLE",
            AuthError::InvalidUserId(_) => "INVALID_USER_ID",
            AuthError::NoValidToken { .. } => "NO_PROVIDER_TOKEN",
            AuthError::Storage(_) => "STORAGE_ERROR",
            AuthError::Crypto(_) => "INTEGRITY_ERROR",
        }
    }
}

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;
