//! Errors raised while talking to `systemctl`.

use std::process::ExitStatus;

use hkbridge_domain::error::ServiceControlError;
use hkbridge_domain::service::ServiceAction;

/// A `systemctl` invocation that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum SystemctlError {
    /// The process could not be spawned at all.
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited with a failure status.
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl SystemctlError {
    /// Attach the action and service name for the domain-level error.
    #[must_use]
    pub fn into_service_error(self, action: ServiceAction, service: &str) -> ServiceControlError {
        let reason = match &self {
            Self::Spawn { source, .. } => format!("{self}: {source}"),
            Self::Exit { .. } => self.to_string(),
        };
        ServiceControlError {
            action,
            service: service.to_string(),
            reason,
        }
    }
}
