//! Config entries store: backup and atomic rewrite of `core.config_entries`.

use std::path::{Path, PathBuf};

use hkbridge_app::ports::ConfigEntriesStore;
use hkbridge_domain::config_entry::ConfigEntriesDocument;
use hkbridge_domain::error::{HkBridgeError, NotFoundError};
use hkbridge_domain::time::{Timestamp, format_backup_suffix};

use crate::error::StorageError;
use crate::fs::{read_json, write_json_atomic};

/// The `core.config_entries` file.
#[derive(Debug, Clone)]
pub struct ConfigEntriesFile {
    path: PathBuf,
}

impl ConfigEntriesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a backup taken at `taken_at` is written.
    #[must_use]
    pub fn backup_path(&self, taken_at: Timestamp) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "config_entries".into(), |name| name.to_string_lossy());
        self.path
            .with_file_name(format!("{file_name}.backup.{}", format_backup_suffix(taken_at)))
    }
}

impl ConfigEntriesStore for ConfigEntriesFile {
    fn load(&self) -> Result<ConfigEntriesDocument, HkBridgeError> {
        read_json(&self.path)?.ok_or_else(|| {
            NotFoundError::Registry {
                path: self.path.clone(),
            }
            .into()
        })
    }

    fn backup(&self, taken_at: Timestamp) -> Result<PathBuf, HkBridgeError> {
        let target = self.backup_path(taken_at);
        std::fs::copy(&self.path, &target).map_err(|source| StorageError::Write {
            path: target.clone(),
            source,
        })?;
        Ok(target)
    }

    fn write(&self, document: &ConfigEntriesDocument) -> Result<PathBuf, HkBridgeError> {
        write_json_atomic(&self.path, document)?;
        Ok(self.path.clone())
    }
}
