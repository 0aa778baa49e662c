//! Cryptographic constants.
//!
//! These values are part of the stored ciphertext format. Changing any of
//! them makes previously stored provider tokens undecryptable.

/// Size of the token encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of XChaCha20-Poly1305 nonces in bytes (192 bits)
pub const NONCE_SIZE: usize = 24;

/// Size of XChaCha20-Poly1305 authentication tags in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Format version prefix carried by every encrypted token
pub const CIPHERTEXT_PREFIX: &str = "enc:v1:";

/// Associated data bound into every sealed provider token
pub const DOMAIN_PROVIDER_TOKEN_AAD: &str = "devportal:provider-token:v1";
