//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.
//!
//! Every port is synchronous: a run reads a handful of small files and issues
//! at most two service-manager calls.

pub mod config_store;
pub mod mapping_store;
pub mod registry;
pub mod service_control;

pub use config_store::ConfigEntriesStore;
pub use mapping_store::MappingStore;
pub use registry::RegistryReader;
pub use service_control::ServiceController;
