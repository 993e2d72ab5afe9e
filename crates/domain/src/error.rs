//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HkBridgeError`] via `#[from]` or an explicit `From` impl.

use std::path::PathBuf;

use crate::service::ServiceAction;

/// Base error shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum HkBridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("service control error")]
    ServiceControl(#[from] ServiceControlError),
}

/// A domain invariant was violated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("bridge {0:?} is declared more than once")]
    DuplicateBridgeName(String),

    #[error("invalid exclusion pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A required artifact does not exist.
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    /// A registry file under the platform's `.storage` directory is missing.
    #[error("registry not found: {}", path.display())]
    Registry { path: PathBuf },

    /// No mapping has been generated yet.
    #[error("mapping not found: {} (run `generate` first)", path.display())]
    Mapping { path: PathBuf },
}

/// The host automation service could not be stopped or started.
#[derive(Debug, thiserror::Error)]
#[error("failed to {action} service {service:?}: {reason}")]
pub struct ServiceControlError {
    pub action: ServiceAction,
    pub service: String,
    pub reason: String,
}
