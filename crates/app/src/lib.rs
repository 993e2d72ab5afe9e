//! # hkbridge-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RegistryReader`: entity, device, area and floor registries
//!   - `ConfigEntriesStore`: read, back up and rewrite the platform's config entries
//!   - `MappingStore`: persist & load the generated mapping
//!   - `ServiceController`: stop/start the host automation service
//! - Hold the per-invocation **registry snapshot** and the area resolver
//! - Define the **use-cases**:
//!   - `AssignmentService`: filter, resolve and assign entities to bridges
//!   - `PlanningService`: count areas and suggest bridge groupings
//!   - `ApplyService`: merge a mapping into the HomeKit config entries
//!   - `InspectionService`: validate and list existing bridges
//!
//! ## Dependency rule
//! Depends on `hkbridge-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod services;
pub mod settings;
