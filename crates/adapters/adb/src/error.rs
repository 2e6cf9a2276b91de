//! ADB adapter error types.

use fireminder_domain::error::MinderError;

/// Errors specific to the ADB adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdbError {
    /// The `adb` binary could not be spawned (usually: not installed).
    #[error("failed to run adb binary {binary:?}: {source}")]
    Spawn {
        /// Configured binary name or path.
        binary: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A single adb invocation exceeded the configured timeout.
    #[error("adb {context} timed out after {seconds}s")]
    Timeout {
        /// What was being attempted (e.g. "window dump").
        context: &'static str,
        /// Configured timeout in seconds.
        seconds: u64,
    },

    /// adb exited with a non-zero status.
    #[error("adb {context} failed (exit code {code:?}): {stderr}")]
    NonZeroExit {
        /// What was being attempted.
        context: &'static str,
        /// Exit code, when the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed stderr output.
        stderr: String,
    },

    /// The device rejected the debug session.
    #[error(
        "ADB reported 'unauthorized' during {context}; accept the 'Allow USB \
         debugging' prompt on the device (ideally with 'Always allow' checked)"
    )]
    Unauthorized {
        /// What was being attempted.
        context: &'static str,
    },

    /// The device was unreachable and `adb connect` did not help.
    #[error("could not connect to {serial}: {detail}")]
    NotConnected {
        /// The `host:port` serial that was targeted.
        serial: String,
        /// Trimmed adb output explaining the failure.
        detail: String,
    },
}

impl AdbError {
    /// Convert into a [`MinderError::Probe`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> MinderError {
        MinderError::Probe(Box::new(self))
    }
}

impl From<AdbError> for MinderError {
    fn from(err: AdbError) -> Self {
        err.into_domain()
    }
}
