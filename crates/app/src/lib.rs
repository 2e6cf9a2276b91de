//! # fireminder-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceProbe` — connect to a device, read its screen state, launch apps
//!   - `TelemetryPublisher` — publish per-cycle state reports
//! - Run the **per-device minder loop**: poll → decide → act → report → sleep
//! - Orchestrate domain objects without knowing *how* device IO or telemetry
//!   transport works
//!
//! ## Dependency rule
//! Depends on `fireminder-domain` only (plus `tokio` for task spawning and
//! sleeping). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod minder;
pub mod ports;
