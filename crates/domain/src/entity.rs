//! Entity: a controllable endpoint read from the platform's entity registry.
//!
//! Only two domains are classified: `light` and `switch`. Anything else is
//! ineligible for bridging.

use serde::{Deserialize, Serialize};

use crate::error::{HkBridgeError, ValidationError};
use crate::id::{AreaId, DeviceId, EntityId};

/// The entity domains that can be exposed through a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityDomain {
    Light,
    Switch,
}

impl EntityDomain {
    /// Classify a domain prefix, returning `None` for unsupported domains.
    #[must_use]
    pub fn parse(domain: &str) -> Option<Self> {
        match domain {
            "light" => Some(Self::Light),
            "switch" => Some(Self::Switch),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Switch => f.write_str("switch"),
        }
    }
}

/// A registry entry. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub platform: String,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub area_id: Option<AreaId>,
    pub device_id: Option<DeviceId>,
    pub disabled: bool,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Validation`] when `entity_id` is empty.
    pub fn validate(&self) -> Result<(), HkBridgeError> {
        if self.entity_id.as_str().is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        Ok(())
    }

    /// The classified domain, or `None` when it is neither a light nor a switch.
    #[must_use]
    pub fn domain(&self) -> Option<EntityDomain> {
        self.entity_id.domain().and_then(EntityDomain::parse)
    }

    /// Whether the entity is enabled and of a supported domain.
    ///
    /// This is the upstream eligibility check applied before the
    /// [`EntityFilter`](crate::filter::EntityFilter).
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        !self.disabled && self.domain().is_some()
    }

    /// Human-readable name: the user-set name, then the integration's
    /// original name, then a title-cased object id.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.original_name.as_deref().filter(|name| !name.is_empty()))
            .map_or_else(
                || title_case(&self.entity_id.object_id().replace('_', " ")),
                str::to_string,
            )
    }
}

fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_alpha = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if previous_is_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            out.push(ch);
            previous_is_alpha = false;
        }
    }
    out
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    entity_id: Option<EntityId>,
    platform: Option<String>,
    name: Option<String>,
    original_name: Option<String>,
    area_id: Option<AreaId>,
    device_id: Option<DeviceId>,
    disabled: bool,
}

impl EntityBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = Some(original_name.into());
        self
    }

    #[must_use]
    pub fn area_id(mut self, area_id: impl Into<AreaId>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<DeviceId>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// The platform defaults to `unknown`.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Validation`] if `entity_id` is missing or empty.
    pub fn build(self) -> Result<Entity, HkBridgeError> {
        let entity = Entity {
            entity_id: self.entity_id.unwrap_or_else(|| EntityId::new("")),
            platform: self.platform.unwrap_or_else(|| "unknown".to_string()),
            name: self.name,
            original_name: self.original_name,
            area_id: self.area_id,
            device_id: self.device_id,
            disabled: self.disabled,
        };
        entity.validate()?;
        Ok(entity)
    }
}
