//! Hashing helpers for cache keys and log redaction.

use blake3::Hasher as Blake3Hasher;
use sha2::{Digest, Sha256};

/// Hash data using BLAKE3
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake3Hasher::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Short, non-reversible fingerprint of a sensitive value for logging.
///
/// Returns the hex encoding of the first 8 bytes of its BLAKE3 hash, so
/// state parameters and user ids can be correlated across log lines
/// without being recoverable from them.
pub fn hash_for_log(value: &str) -> String {
    let hash = blake3_hash(value.as_bytes());
    hex::encode(&hash[..8])
}

/// SHA-256 of the input as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
