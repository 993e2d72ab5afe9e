//! # hkbridge-domain
//!
//! Pure domain model for the hkbridge HomeKit bridge planner.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (lights and switches read from the entity registry)
//! - Define **Devices**, **Areas** and **Floors** used to locate entities
//! - Define **Bridges** (user-declared area groupings and the capacity ceiling)
//! - Decide entity eligibility (**filter**) and hold the assignment **mapping**
//! - Greedy **capacity** planning of areas into proposed bridges
//! - Typed views over the platform's HomeKit **config entries**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod area;
pub mod bridge;
pub mod capacity;
pub mod config_entry;
pub mod device;
pub mod entity;
pub mod filter;
pub mod mapping;
pub mod service;
