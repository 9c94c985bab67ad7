//! Access to the OS "write to shared media" permission.

use crate::error::Result;

/// Continuation invoked once with the user's decision.
pub type GrantCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// The platform permission subsystem.
pub trait PermissionProvider: Send + Sync {
    /// Whether writing to the shared gallery is currently allowed.
    fn check_granted(&self) -> Result<bool>;

    /// Ask the user for the grant. Must return without waiting for the
    /// answer and invoke `on_result` exactly once when it arrives.
    fn request_grant(&self, on_result: GrantCallback);
}

/// Provider for platforms without a runtime media permission (desktop).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

impl PermissionProvider for AlwaysGranted {
    fn check_granted(&self) -> Result<bool> {
        Ok(true)
    }

    fn request_grant(&self, on_result: GrantCallback) {
        on_result(true);
    }
}
