//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`MinderError`]
//! at the port boundary via `into_domain()` / `#[from]`.

/// Top-level error for everything that crosses a port boundary.
///
/// The underlying error is embedded in the `Display` output: the minder
/// loop logs these with `%err`, and the adapter detail (connect failure,
/// timeout context, the unauthorized hint) must survive that rendering.
#[derive(Debug, thiserror::Error)]
pub enum MinderError {
    /// A domain invariant was violated.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Probing or commanding the device failed (transport-level).
    ///
    /// The decision for that poll cycle is skipped; the idle tracker is
    /// left untouched and the next cycle retries.
    #[error("device probe error: {0}")]
    Probe(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Publishing telemetry failed. Never affects decision logic.
    #[error("telemetry error: {0}")]
    Telemetry(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Violations of domain invariants, raised when configuration is loaded.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A device was configured without a name.
    #[error("device name must not be empty")]
    EmptyName,

    /// A device was configured without a host.
    #[error("device {device:?} is missing a valid host")]
    EmptyHost {
        /// Name of the offending device.
        device: String,
    },

    /// A device has no home-screen packages to match against.
    #[error("device {device:?} must have a non-empty home package list")]
    NoHomePackages {
        /// Name of the offending device.
        device: String,
    },

    /// A device was configured without an idle-target component.
    #[error("device {device:?} is missing a target component")]
    EmptyTargetComponent {
        /// Name of the offending device.
        device: String,
    },
}
