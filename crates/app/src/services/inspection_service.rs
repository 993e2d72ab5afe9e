//! Inspection service: read-only views of the existing HomeKit bridges.

use hkbridge_domain::bridge::is_over_limit;
use hkbridge_domain::config_entry::{ConfigEntry, FilterMode};
use hkbridge_domain::error::HkBridgeError;

use crate::ports::ConfigEntriesStore;

/// Title shown for entries without one.
const UNKNOWN: &str = "Unknown";

/// Filter mode and size of an existing bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeStatus {
    pub title: String,
    pub mode: FilterMode,
}

impl BridgeStatus {
    /// Only explicit include lists have a known size to check.
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        matches!(self.mode, FilterMode::Include(count) if is_over_limit(count))
    }
}

/// Identity of an existing bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeListing {
    pub title: String,
    pub entry_id: String,
    pub port: Option<String>,
}

/// Application service for `validate` and `list`.
pub struct InspectionService<C> {
    config_entries: C,
}

impl<C: ConfigEntriesStore> InspectionService<C> {
    pub fn new(config_entries: C) -> Self {
        Self { config_entries }
    }

    /// Filter mode of every HomeKit bridge, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Registry`](hkbridge_domain::error::NotFoundError::Registry)
    /// when the config entries are missing, or a storage error.
    pub fn validate(&self) -> Result<Vec<BridgeStatus>, HkBridgeError> {
        let document = self.config_entries.load()?;
        let statuses: Vec<BridgeStatus> = document
            .homekit_entries()
            .map(|entry| BridgeStatus {
                title: title(entry),
                mode: entry.entity_filter().mode(),
            })
            .collect();
        for status in statuses.iter().filter(|s| s.is_over_limit()) {
            tracing::warn!(bridge = %status.title, "bridge exceeds capacity ceiling");
        }
        Ok(statuses)
    }

    /// Title, entry id and port of every HomeKit bridge, in file order.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn list(&self) -> Result<Vec<BridgeListing>, HkBridgeError> {
        let document = self.config_entries.load()?;
        Ok(document
            .homekit_entries()
            .map(|entry| BridgeListing {
                title: title(entry),
                entry_id: entry.entry_id().unwrap_or(UNKNOWN).to_string(),
                port: entry.port(),
            })
            .collect())
    }
}

fn title(entry: &ConfigEntry) -> String {
    entry.title().unwrap_or(UNKNOWN).to_string()
}
