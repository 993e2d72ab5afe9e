//! On-disk registry records and their conversion to domain types.
//!
//! Every registry file wraps its payload in a top-level `data` object.
//! Unknown fields are ignored.

use serde::Deserialize;

use hkbridge_domain::area::{Area, Floor};
use hkbridge_domain::device::Device;
use hkbridge_domain::entity::Entity;
use hkbridge_domain::id::{AreaId, DeviceId, EntityId, FloorId};

#[derive(Debug, Deserialize)]
pub(crate) struct RegistryFile<T> {
    pub data: T,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EntityRegistryData {
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeviceRegistryData {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AreaRegistryData {
    #[serde(default)]
    pub areas: Vec<AreaRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FloorRegistryData {
    #[serde(default)]
    pub floors: Vec<FloorRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityRecord {
    pub entity_id: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub area_id: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub disabled_by: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

impl From<EntityRecord> for Entity {
    fn from(record: EntityRecord) -> Self {
        Self {
            entity_id: EntityId::new(record.entity_id),
            platform: record.platform.unwrap_or_else(|| "unknown".to_string()),
            name: record.name,
            original_name: record.original_name,
            area_id: non_empty(record.area_id).map(AreaId::new),
            device_id: non_empty(record.device_id).map(DeviceId::new),
            disabled: record.disabled_by.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceRecord {
    pub id: String,
    #[serde(default)]
    pub area_id: Option<String>,
}

impl From<DeviceRecord> for Device {
    fn from(record: DeviceRecord) -> Self {
        Device::new(record.id, non_empty(record.area_id).map(AreaId::new))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AreaRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub floor_id: Option<String>,
}

impl From<AreaRecord> for Area {
    fn from(record: AreaRecord) -> Self {
        Self {
            id: AreaId::new(record.id),
            name: record.name,
            floor_id: non_empty(record.floor_id).map(FloorId::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FloorRecord {
    pub floor_id: String,
    pub name: String,
}

impl From<FloorRecord> for Floor {
    fn from(record: FloorRecord) -> Self {
        Floor::new(record.floor_id, record.name)
    }
}

/// The platform writes `""` and `null` interchangeably for "unset".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
