//! Device probe port — reads a device's screen state and launches apps.
//!
//! The transport behind this port is an opaque external command (the ADB
//! adapter in production, scripted fakes in tests). Every method may block on
//! the network; implementations bound each call with their own timeout.

use std::future::Future;

use fireminder_domain::error::MinderError;

/// Probes and commands one streaming device.
///
/// A probe instance is bound to a single device; the minder loop owns it
/// exclusively, so implementations need no internal locking.
pub trait DeviceProbe: Send + Sync {
    /// Make sure the device is reachable, reconnecting if necessary.
    ///
    /// An error means this poll cycle is skipped and retried next time —
    /// it is never fatal to the loop.
    fn ensure_connected(&self) -> impl Future<Output = Result<(), MinderError>> + Send;

    /// Which package currently has focus on the device.
    ///
    /// `Ok(None)` means the command succeeded but no focused package could
    /// be determined (e.g. during boot or a transient screen).
    fn foreground_package(
        &self,
    ) -> impl Future<Output = Result<Option<String>, MinderError>> + Send;

    /// Whether any media session is actively playing.
    fn media_playing(&self) -> impl Future<Output = Result<bool, MinderError>> + Send;

    /// Launch the given component (or bare package) on the device.
    fn launch(&self, component: &str) -> impl Future<Output = Result<(), MinderError>> + Send;
}

impl<T: DeviceProbe> DeviceProbe for std::sync::Arc<T> {
    fn ensure_connected(&self) -> impl Future<Output = Result<(), MinderError>> + Send {
        (**self).ensure_connected()
    }

    fn foreground_package(
        &self,
    ) -> impl Future<Output = Result<Option<String>, MinderError>> + Send {
        (**self).foreground_package()
    }

    fn media_playing(&self) -> impl Future<Output = Result<bool, MinderError>> + Send {
        (**self).media_playing()
    }

    fn launch(&self, component: &str) -> impl Future<Output = Result<(), MinderError>> + Send {
        (**self).launch(component)
    }
}
