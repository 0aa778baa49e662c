//! Provider token encryption using XChaCha20-Poly1305.
//!
//! Ciphertexts are encoded as `enc:v1:` followed by standard base64 of
//! `nonce || sealed`, where `sealed` carries the 16-byte authentication tag.

use crate::{constants::*, errors::*};
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Encryption context holding the process key.
///
/// Built once at startup from the configured secret and shared by reference.
/// The key cannot be read back out and is wiped when the context is dropped.
pub struct CipherContext {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl CipherContext {
    /// Create a context from raw key bytes
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Create a context from a base64-encoded 32-byte secret
    pub fn from_base64_secret(secret: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(secret.trim())
                .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?,
        );

        if decoded.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: decoded.len(),
            });
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&decoded);
        let context = Self::new(key);
        zeroize::Zeroize::zeroize(&mut key);
        Ok(context)
    }

    /// Encrypt a token, returning the versioned string form
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = generate_nonce()?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.key[..]));

        let sealed = cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: DOMAIN_PROVIDER_TOKEN_AAD.as_bytes(),
                },
            )
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut framed = Vec::with_capacity(NONCE_SIZE + sealed.len());
        framed.extend_from_slice(&nonce);
        framed.extend_from_slice(&sealed);

        Ok(format!("{}{}", CIPHERTEXT_PREFIX, STANDARD.encode(framed)))
    }

    /// Decrypt a value produced by [`CipherContext::encrypt`]
    ///
    /// Values without the version prefix are rejected with
    /// [`CryptoError::NotEncrypted`]; there is no plaintext fallback.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if !is_encrypted(ciphertext) {
            return Err(CryptoError::NotEncrypted);
        }

        let encoded = &ciphertext[CIPHERTEXT_PREFIX.len()..];
        let framed = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base64: {}", e)))?;

        if framed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::InvalidInput(format!(
                "ciphertext too short: {} bytes",
                framed.len()
            )));
        }

        let (nonce, sealed) = framed.split_at(NONCE_SIZE);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.key[..]));

        let plaintext = Zeroizing::new(
            cipher
                .decrypt(
                    XNonce::from_slice(nonce),
                    Payload {
                        msg: sealed,
                        aad: DOMAIN_PROVIDER_TOKEN_AAD.as_bytes(),
                    },
                )
                .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?,
        );

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| CryptoError::InvalidInput("plaintext is not UTF-8".to_string()))
    }
}

impl fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherContext")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Check for the ciphertext version prefix in constant time
pub fn is_encrypted(value: &str) -> bool {
    let bytes = value.as_bytes();
    let prefix = CIPHERTEXT_PREFIX.as_bytes();
    if bytes.len() < prefix.len() {
        return false;
    }
    bytes[..prefix.len()].ct_eq(prefix).into()
}

/// Generate a random XChaCha20 nonce
pub fn generate_nonce() -> Result<[u8; NONCE_SIZE]> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng()
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::RandomGenerationFailed(e.to_string()))?;
    Ok(nonce)
}
