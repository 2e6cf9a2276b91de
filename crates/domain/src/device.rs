//! Device configuration — one watched streaming device and its idle policy.

use serde::Deserialize;

use crate::error::ValidationError;

/// Default ADB-over-TCP port on Fire TV class devices.
pub const DEFAULT_ADB_PORT: u16 = 5555;

/// Launcher packages that count as "home screen" when no explicit list is
/// configured. These cover the stock Fire TV launchers.
pub const DEFAULT_HOME_PACKAGES: &[&str] =
    &["com.amazon.tv.launcher", "com.amazon.firetv.launcher"];

/// A single device to watch. Immutable after configuration load.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Human-readable device name, also used in telemetry topics.
    pub name: String,
    /// Hostname or IP address the device is reachable at.
    pub host: String,
    /// ADB-over-TCP port.
    #[serde(default = "default_adb_port")]
    pub adb_port: u16,
    /// Foreground packages that count as the home screen.
    #[serde(default = "default_home_packages")]
    pub home_packages: Vec<String>,
    /// Component (or bare package) to launch when the device idles,
    /// e.g. `com.example.gallery/.SlideshowActivity`.
    pub target_component: String,
}

fn default_adb_port() -> u16 {
    DEFAULT_ADB_PORT
}

fn default_home_packages() -> Vec<String> {
    DEFAULT_HOME_PACKAGES.iter().map(ToString::to_string).collect()
}

impl DeviceConfig {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name, host, home package list,
    /// or target component is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.host.trim().is_empty() {
            return Err(ValidationError::EmptyHost {
                device: self.name.clone(),
            });
        }
        if self.home_packages.is_empty() {
            return Err(ValidationError::NoHomePackages {
                device: self.name.clone(),
            });
        }
        if self.target_component.trim().is_empty() {
            return Err(ValidationError::EmptyTargetComponent {
                device: self.name.clone(),
            });
        }
        Ok(())
    }

    /// The package half of the target component.
    ///
    /// `com.example.gallery/.SlideshowActivity` → `com.example.gallery`;
    /// a bare package is returned unchanged.
    #[must_use]
    pub fn target_package(&self) -> &str {
        self.target_component
            .split_once('/')
            .map_or(self.target_component.as_str(), |(pkg, _)| pkg)
    }

    /// The `host:port` ADB serial used to address this device.
    #[must_use]
    pub fn adb_serial(&self) -> String {
        format!("{}:{}", self.host, self.adb_port)
    }

    /// Whether the given foreground package is one of this device's
    /// home-screen launchers.
    #[must_use]
    pub fn is_home_package(&self, package: &str) -> bool {
        self.home_packages.iter().any(|p| p == package)
    }
}
