//! Storage-specific error type wrapping filesystem and JSON errors.

use std::path::PathBuf;

use hkbridge_domain::error::HkBridgeError;

/// Errors originating from the filesystem storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading a file failed.
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing, copying or renaming a file failed.
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file is not the JSON shape we expect.
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize a value to JSON.
    #[error("JSON serialization error")]
    Serialize(#[from] serde_json::Error),
}

impl From<StorageError> for HkBridgeError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
