//! ADB adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for running the external `adb` binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdbConfig {
    /// Name or path of the `adb` binary.
    pub binary: String,
    /// Upper bound for a single adb invocation, in seconds.
    pub command_timeout_secs: u64,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            binary: "adb".to_string(),
            command_timeout_secs: 5,
        }
    }
}

impl AdbConfig {
    /// The per-command timeout as a [`Duration`].
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
