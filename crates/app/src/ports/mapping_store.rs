//! Mapping port: durable hand-off between `generate` and `apply`.

use std::path::PathBuf;

use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::mapping::Mapping;

/// Persists the generated [`Mapping`].
pub trait MappingStore {
    /// Persist `mapping`, replacing any previous one, and return its location.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the mapping cannot be written.
    fn save(&self, mapping: &Mapping) -> Result<PathBuf, HkBridgeError>;

    /// Load the last persisted mapping.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Mapping`](hkbridge_domain::error::NotFoundError::Mapping)
    /// when nothing was generated yet, or a storage error.
    fn load(&self) -> Result<Mapping, HkBridgeError>;
}
