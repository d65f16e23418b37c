//! Locate LED capability.
//!
//! View builders only need to know whether a device has a controllable
//! locate LED and whether it is lit. Implementations live in
//! `platform::locate`.

use crate::error::Result;

/// Hardware that can light a device bay's locate LED.
pub trait LocateProvider: Send + Sync {
    /// `Ok(lit)` when the device has a locate LED, an error when it has
    /// none or the backend could not be queried.
    fn query(&self, device: &str) -> Result<bool>;

    /// Turn the device's locate LED on or off.
    fn set(&self, device: &str, on: bool) -> Result<()>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
