//! Device: a physical thing registered with the platform.
//!
//! Only used to resolve the area of an entity that has none of its own.

use serde::{Deserialize, Serialize};

use crate::id::{AreaId, DeviceId};

/// A registered device and the area it was placed in, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub area_id: Option<AreaId>,
}

impl Device {
    #[must_use]
    pub fn new(id: impl Into<DeviceId>, area_id: Option<AreaId>) -> Self {
        Self {
            id: id.into(),
            area_id,
        }
    }
}
