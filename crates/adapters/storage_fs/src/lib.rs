//! # hkbridge-adapter-storage-fs
//!
//! Filesystem persistence adapter.
//!
//! ## Responsibilities
//! - Implement `RegistryReader` over `<config>/.storage/core.*` JSON files
//! - Implement `ConfigEntriesStore`: timestamped backup copies and atomic
//!   whole-file replacement of `core.config_entries`
//! - Implement `MappingStore` as a pretty-printed `homekit_mapping.json`
//! - Map between on-disk records and domain types
//!
//! ## Dependency rule
//! Depends on `hkbridge-app` (for port traits) and `hkbridge-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod fs;
mod records;

pub mod config_entries_store;
pub mod mapping_store;
pub mod registry_reader;

pub use config_entries_store::ConfigEntriesFile;
pub use error::StorageError;
pub use mapping_store::JsonMappingStore;
pub use registry_reader::HaStorage;
