//! Mapping store: `homekit_mapping.json` in the output directory.

use std::path::{Path, PathBuf};

use hkbridge_app::ports::MappingStore;
use hkbridge_domain::error::{HkBridgeError, NotFoundError};
use hkbridge_domain::mapping::Mapping;

use crate::fs::{read_json, write_json_atomic};

/// File name of the persisted mapping.
pub const MAPPING_FILE_NAME: &str = "homekit_mapping.json";

/// JSON file holding the last generated [`Mapping`].
#[derive(Debug, Clone)]
pub struct JsonMappingStore {
    path: PathBuf,
}

impl JsonMappingStore {
    /// Store the mapping as [`MAPPING_FILE_NAME`] inside `output_dir`.
    pub fn in_dir(output_dir: impl AsRef<Path>) -> Self {
        Self {
            path: output_dir.as_ref().join(MAPPING_FILE_NAME),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingStore for JsonMappingStore {
    fn save(&self, mapping: &Mapping) -> Result<PathBuf, HkBridgeError> {
        write_json_atomic(&self.path, mapping)?;
        Ok(self.path.clone())
    }

    fn load(&self) -> Result<Mapping, HkBridgeError> {
        read_json(&self.path)?.ok_or_else(|| {
            NotFoundError::Mapping {
                path: self.path.clone(),
            }
            .into()
        })
    }
}
