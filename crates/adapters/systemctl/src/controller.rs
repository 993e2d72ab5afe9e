//! `systemctl` driven [`ServiceController`].

use std::process::Command;

use hkbridge_app::ports::ServiceController;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::service::ServiceAction;

use crate::error::SystemctlError;

const SYSTEMCTL: &str = "systemctl";
const SUDO: &str = "sudo";

/// Controls a systemd unit, optionally through `sudo`.
#[derive(Debug, Clone)]
pub struct SystemctlController {
    service: String,
    use_sudo: bool,
}

impl SystemctlController {
    pub fn new(service: impl Into<String>, use_sudo: bool) -> Self {
        Self {
            service: service.into(),
            use_sudo,
        }
    }

    /// Build the command for `action` without running it.
    #[must_use]
    pub fn command(&self, action: ServiceAction) -> Command {
        let mut command = if self.use_sudo {
            let mut command = Command::new(SUDO);
            command.arg(SYSTEMCTL);
            command
        } else {
            Command::new(SYSTEMCTL)
        };
        command.arg(action.as_str()).arg(&self.service);
        command
    }

    fn run(&self, action: ServiceAction) -> Result<(), SystemctlError> {
        let mut command = self.command(action);
        let program = command.get_program().to_string_lossy().into_owned();
        let output = command
            .output()
            .map_err(|source| SystemctlError::Spawn {
                program: program.clone(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        Err(SystemctlError::Exit {
            program,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl ServiceController for SystemctlController {
    fn service_name(&self) -> &str {
        &self.service
    }

    fn control(&self, action: ServiceAction) -> Result<(), HkBridgeError> {
        tracing::debug!(service = %self.service, %action, sudo = self.use_sudo, "running systemctl");
        self.run(action).map_err(|err| {
            tracing::error!(service = %self.service, %action, error = %err, "service control failed");
            err.into_service_error(action, &self.service).into()
        })
    }
}
