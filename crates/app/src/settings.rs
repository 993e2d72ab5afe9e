//! Planner settings: the user's bridge declarations and exclusions.
//!
//! Built once by the composition root and handed to each service.

use hkbridge_domain::bridge::{BridgeConfig, validate_bridges};
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::filter::EntityFilter;

/// Immutable configuration consumed by the use-cases.
#[derive(Debug, Clone, Default)]
pub struct BridgeSettings {
    bridges: Vec<BridgeConfig>,
    filter: EntityFilter,
}

impl BridgeSettings {
    /// Validate the bridge list and bundle it with the filter.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Validation`] when a bridge name is empty or
    /// declared twice.
    pub fn new(bridges: Vec<BridgeConfig>, filter: EntityFilter) -> Result<Self, HkBridgeError> {
        validate_bridges(&bridges)?;
        Ok(Self { bridges, filter })
    }

    /// Bridges in declaration order.
    #[must_use]
    pub fn bridges(&self) -> &[BridgeConfig] {
        &self.bridges
    }

    #[must_use]
    pub fn filter(&self) -> &EntityFilter {
        &self.filter
    }
}
