//! Telemetry port — publishes per-cycle state reports.

use std::future::Future;

use fireminder_domain::error::MinderError;
use fireminder_domain::report::StateReport;

/// Publishes a device's state report after each poll cycle.
///
/// Telemetry is optional and best-effort: the minder loop logs publish
/// failures and carries on — they never affect decisions.
pub trait TelemetryPublisher: Send + Sync {
    /// Publish one state report. The transport derives the destination
    /// (e.g. an MQTT topic) from the report's device name.
    fn publish_state(
        &self,
        report: &StateReport,
    ) -> impl Future<Output = Result<(), MinderError>> + Send;
}

impl<T: TelemetryPublisher> TelemetryPublisher for std::sync::Arc<T> {
    fn publish_state(
        &self,
        report: &StateReport,
    ) -> impl Future<Output = Result<(), MinderError>> + Send {
        (**self).publish_state(report)
    }
}
