//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened or created
    #[error("Failed to open database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rocksdb::Error,
    },

    /// Read, write or iteration failure
    #[error("Database error: {0}")]
    Database(#[from] rocksdb::Error),

    /// A key or value could not be encoded
    #[error("Failed to encode entry: {0}")]
    Encode(#[source] bincode::Error),

    /// A stored value does not decode as the requested type
    #[error("Corrupt entry in column family {cf}: {source}")]
    Decode {
        cf: String,
        #[source]
        source: bincode::Error,
    },

    #[error("Unknown column family: {0}")]
    UnknownColumnFamily(String),

    /// Temporary directory setup for throwaway databases
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
