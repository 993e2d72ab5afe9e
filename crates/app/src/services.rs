//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod apply_service;
pub mod assignment_service;
pub mod inspection_service;
pub mod planning_service;
