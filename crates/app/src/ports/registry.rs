//! Registry port: read-only access to the platform's registries.

use hkbridge_domain::area::{Area, Floor};
use hkbridge_domain::device::Device;
use hkbridge_domain::entity::Entity;
use hkbridge_domain::error::HkBridgeError;

/// Loads registry tables. Called once per invocation.
pub trait RegistryReader {
    /// Every entity in the entity registry.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Registry`](hkbridge_domain::error::NotFoundError::Registry)
    /// when the registry is missing, or a storage error.
    fn load_entities(&self) -> Result<Vec<Entity>, HkBridgeError>;

    /// Every device in the device registry.
    ///
    /// # Errors
    ///
    /// Same as [`load_entities`](Self::load_entities).
    fn load_devices(&self) -> Result<Vec<Device>, HkBridgeError>;

    /// Every area in the area registry.
    ///
    /// # Errors
    ///
    /// Same as [`load_entities`](Self::load_entities).
    fn load_areas(&self) -> Result<Vec<Area>, HkBridgeError>;

    /// Floors, or `None` when the platform has no floor registry.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the registry exists but cannot be read.
    fn load_floors(&self) -> Result<Option<Vec<Floor>>, HkBridgeError>;
}
