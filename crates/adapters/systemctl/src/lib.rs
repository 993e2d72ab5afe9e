//! # hkbridge-adapter-systemctl
//!
//! Service control adapter backed by `systemctl`.
//!
//! ## Responsibilities
//! - Implement `ServiceController` by running `[sudo] systemctl <action> <service>`
//! - Turn a failed invocation into a `ServiceControlError` carrying stderr
//!
//! ## Dependency rule
//! Depends on `hkbridge-app` (for the port trait) and `hkbridge-domain`.

mod controller;
mod error;

pub use controller::SystemctlController;
pub use error::SystemctlError;
