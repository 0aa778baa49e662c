//! # devportal-crypto
//!
//! Cryptographic primitives for the devportal auth core.
//!
//! ## Security Properties
//!
//! - Provider access tokens are sealed with XChaCha20-Poly1305 before storage
//! - Ciphertexts are versioned; unversioned input never decrypts
//! - Key material is zeroized on drop and never printed
//! - No unsafe code

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cipher;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod utils;

pub use cipher::CipherContext;
pub use constants::*;
pub use errors::CryptoError;
pub use hashing::*;
pub use utils::*;
