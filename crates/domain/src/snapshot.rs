//! Device snapshot — what is on screen at one poll.

use crate::device::DeviceConfig;
use crate::time::Timestamp;

/// The observable state of a device at a single poll, with the booleans the
/// decision rules work on already derived from the device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Foreground package, when the window dump exposed one.
    pub foreground_package: Option<String>,
    /// Whether any media session reported the PLAYING state.
    pub media_playing: bool,
    /// Foreground package is one of the configured home launchers.
    pub home_screen: bool,
    /// Foreground package is the idle-target app itself.
    pub in_target_app: bool,
    /// When this snapshot was taken.
    pub observed_at: Timestamp,
}

impl DeviceSnapshot {
    /// Build a snapshot from raw probe results, deriving `home_screen` and
    /// `in_target_app` from the device configuration.
    #[must_use]
    pub fn derive(
        device: &DeviceConfig,
        foreground_package: Option<String>,
        media_playing: bool,
        observed_at: Timestamp,
    ) -> Self {
        let home_screen = foreground_package
            .as_deref()
            .is_some_and(|pkg| device.is_home_package(pkg));
        let in_target_app = foreground_package
            .as_deref()
            .is_some_and(|pkg| pkg == device.target_package());

        Self {
            foreground_package,
            media_playing,
            home_screen,
            in_target_app,
            observed_at,
        }
    }

    /// The `(foreground_package, media_playing)` pair the idle tracker keys on.
    #[must_use]
    pub fn state_pair(&self) -> (Option<&str>, bool) {
        (self.foreground_package.as_deref(), self.media_playing)
    }
}
