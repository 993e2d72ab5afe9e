//! Area and floor: physical-location groupings for devices and entities.

use serde::{Deserialize, Serialize};

use crate::error::{HkBridgeError, ValidationError};
use crate::id::{AreaId, FloorId};

/// A room or zone. Bridges claim areas by [`name`](Self::name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub floor_id: Option<FloorId>,
}

impl Area {
    /// Create a builder for constructing an [`Area`].
    #[must_use]
    pub fn builder() -> AreaBuilder {
        AreaBuilder::default()
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

/// Step-by-step builder for [`Area`].
#[derive(Debug, Default)]
pub struct AreaBuilder {
    id: Option<AreaId>,
    name: Option<String>,
    floor_id: Option<FloorId>,
}

impl AreaBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<AreaId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn floor_id(mut self, floor_id: impl Into<FloorId>) -> Self {
        self.floor_id = Some(floor_id.into());
        self
    }

    /// Consume the builder, validate, and return an [`Area`].
    ///
    /// The id defaults to the slugified name when not set.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Area, HkBridgeError> {
        let name = self.name.unwrap_or_default();
        let area = Area {
            id: self
                .id
                .unwrap_or_else(|| AreaId::new(name.to_lowercase().replace(' ', "_"))),
            name,
            floor_id: self.floor_id,
        };
        area.validate()?;
        Ok(area)
    }
}

/// A storey of the home, grouping several areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub floor_id: FloorId,
    pub name: String,
}

impl Floor {
    #[must_use]
    pub fn new(floor_id: impl Into<FloorId>, name: impl Into<String>) -> Self {
        Self {
            floor_id: floor_id.into(),
            name: name.into(),
        }
    }
}
