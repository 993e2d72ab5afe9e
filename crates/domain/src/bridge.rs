//! Bridge: a user-declared group of areas exposed as one HomeKit bridge.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{HkBridgeError, ValidationError};

/// Maximum number of accessories a single bridge should carry.
///
/// This is advisory: counts above it are reported, never rejected.
pub const CAPACITY_CEILING: usize = 150;

/// Whether `count` entities exceed [`CAPACITY_CEILING`].
#[must_use]
pub fn is_over_limit(count: usize) -> bool {
    count > CAPACITY_CEILING
}

/// A bridge declaration from the user configuration.
///
/// `name` joins against the `title` of the platform's HomeKit config entry.
/// `areas` are matched against [`Area::name`](crate::area::Area::name), in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub name: String,
    #[serde(default)]
    pub areas: Vec<String>,
}

impl BridgeConfig {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            areas: areas.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this bridge claims the area with the given name.
    #[must_use]
    pub fn claims(&self, area_name: &str) -> bool {
        self.areas.iter().any(|area| area == area_name)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), HkBridgeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Validate a full bridge list: every bridge valid, names unique.
///
/// An area claimed by several bridges is legal; the first declaration wins.
///
/// # Errors
///
/// Returns [`HkBridgeError::Validation`] on the first violation.
pub fn validate_bridges(bridges: &[BridgeConfig]) -> Result<(), HkBridgeError> {
    let mut seen = HashSet::with_capacity(bridges.len());
    for bridge in bridges {
        bridge.validate()?;
        if !seen.insert(bridge.name.as_str()) {
            return Err(ValidationError::DuplicateBridgeName(bridge.name.clone()).into());
        }
    }
    Ok(())
}

/// Find the first bridge, in declaration order, claiming `area_name`.
#[must_use]
pub fn first_claiming<'a>(bridges: &'a [BridgeConfig], area_name: &str) -> Option<&'a BridgeConfig> {
    bridges.iter().find(|bridge| bridge.claims(area_name))
}
