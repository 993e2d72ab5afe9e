//! Config entries port: the platform's `core.config_entries` file.

use std::path::PathBuf;

use hkbridge_domain::config_entry::ConfigEntriesDocument;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::time::Timestamp;

/// Reads and rewrites the config entries document.
pub trait ConfigEntriesStore {
    /// Load the current document.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Registry`](hkbridge_domain::error::NotFoundError::Registry)
    /// when the file is missing, or a storage error.
    fn load(&self) -> Result<ConfigEntriesDocument, HkBridgeError>;

    /// Copy the current file aside, named after `taken_at`, and return the
    /// backup location.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the copy fails.
    fn backup(&self, taken_at: Timestamp) -> Result<PathBuf, HkBridgeError>;

    /// Replace the file with `document` and return its location.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the write fails.
    fn write(&self, document: &ConfigEntriesDocument) -> Result<PathBuf, HkBridgeError>;
}
