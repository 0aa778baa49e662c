//! # devportal-storage
//!
//! Storage abstraction for the devportal auth core, backed by RocksDB.
//!
//! Values are bincode-encoded and grouped into column families, one per
//! record kind. The [`Storage`] trait keeps callers independent of RocksDB
//! so services can be exercised against a throwaway database in tests.

#![warn(clippy::all)]

pub mod column_families;
pub mod errors;
pub mod rocksdb_impl;
pub mod traits;

pub use column_families::*;
pub use errors::{Result, StorageError};
pub use rocksdb_impl::RocksDbStorage;
pub use traits::{Batch, BatchExt, Storage};
