//! Service control port: lifecycle of the host automation service.

use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::service::ServiceAction;

/// Stops and starts the platform around a config write.
///
/// Calls block until the service manager answers. There is no retry.
pub trait ServiceController {
    /// Name of the controlled service, for reporting.
    fn service_name(&self) -> &str;

    /// Issue `action` to the service manager.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::ServiceControl`] when the action fails.
    fn control(&self, action: ServiceAction) -> Result<(), HkBridgeError>;
}
