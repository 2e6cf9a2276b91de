//! MQTT adapter error types.

use fireminder_domain::error::MinderError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected the publish request.
    #[error("MQTT publish failed: {0}")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to serialize a state report as JSON.
    #[error("failed to serialize state report: {0}")]
    PayloadSerialize(#[source] serde_json::Error),
}

impl MqttError {
    /// Convert into a [`MinderError::Telemetry`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> MinderError {
        MinderError::Telemetry(Box::new(self))
    }
}

impl From<MqttError> for MinderError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}
