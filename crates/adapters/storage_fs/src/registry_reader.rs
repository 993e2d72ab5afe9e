//! Registry reader over the platform's `.storage` directory.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use hkbridge_app::ports::RegistryReader;
use hkbridge_domain::area::{Area, Floor};
use hkbridge_domain::device::Device;
use hkbridge_domain::entity::Entity;
use hkbridge_domain::error::{HkBridgeError, NotFoundError};

use crate::config_entries_store::ConfigEntriesFile;
use crate::fs::read_json;
use crate::records::{
    AreaRegistryData, DeviceRegistryData, EntityRegistryData, FloorRegistryData, RegistryFile,
};

/// The platform's configuration directory (the one holding `.storage`).
#[derive(Debug, Clone)]
pub struct HaStorage {
    storage_dir: PathBuf,
}

impl HaStorage {
    /// Point at the configuration directory `config_path`.
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            storage_dir: config_path.as_ref().join(".storage"),
        }
    }

    /// Path of the `core.<name>` registry file.
    #[must_use]
    pub fn registry_path(&self, name: &str) -> PathBuf {
        self.storage_dir.join(format!("core.{name}"))
    }

    /// The config entries store living next to the registries.
    #[must_use]
    pub fn config_entries(&self) -> ConfigEntriesFile {
        ConfigEntriesFile::new(self.registry_path("config_entries"))
    }

    fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, HkBridgeError> {
        let path = self.registry_path(name);
        let file: Option<RegistryFile<T>> = read_json(&path)?;
        tracing::debug!(path = %path.display(), found = file.is_some(), "read registry");
        Ok(file.map(|file| file.data))
    }

    fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, HkBridgeError> {
        self.optional(name)?.ok_or_else(|| {
            NotFoundError::Registry {
                path: self.registry_path(name),
            }
            .into()
        })
    }
}

impl RegistryReader for HaStorage {
    fn load_entities(&self) -> Result<Vec<Entity>, HkBridgeError> {
        let data: EntityRegistryData = self.required("entity_registry")?;
        Ok(data.entities.into_iter().map(Entity::from).collect())
    }

    fn load_devices(&self) -> Result<Vec<Device>, HkBridgeError> {
        let data: DeviceRegistryData = self.required("device_registry")?;
        Ok(data.devices.into_iter().map(Device::from).collect())
    }

    fn load_areas(&self) -> Result<Vec<Area>, HkBridgeError> {
        let data: AreaRegistryData = self.required("area_registry")?;
        Ok(data.areas.into_iter().map(Area::from).collect())
    }

    fn load_floors(&self) -> Result<Option<Vec<Floor>>, HkBridgeError> {
        let data: Option<FloorRegistryData> = self.optional("floor_registry")?;
        Ok(data.map(|data| data.floors.into_iter().map(Floor::from).collect()))
    }
}
