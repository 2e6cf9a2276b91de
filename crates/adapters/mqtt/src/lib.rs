//! # fireminder-adapter-mqtt
//!
//! MQTT adapter — implements the [`TelemetryPublisher`] port on top of
//! `rumqttc`.
//!
//! ## Responsibilities
//! - Connect to the configured broker (optionally with credentials)
//! - Drive the rumqttc event loop in a background task (this is also what
//!   gives us automatic reconnects)
//! - Publish each state report as compact JSON to
//!   `<topic_prefix>/<device_name>/state`, QoS 0, not retained
//!
//! ## Dependency rule
//! Depends on `fireminder-app` (port traits) and `fireminder-domain` only.

pub mod config;
pub mod error;

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, MqttOptions, QoS};

use fireminder_app::ports::TelemetryPublisher;
use fireminder_domain::error::MinderError;
use fireminder_domain::report::StateReport;

pub use config::MqttConfig;
pub use error::MqttError;

/// Delay before re-polling the event loop after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Telemetry publisher backed by a rumqttc [`AsyncClient`].
///
/// One publisher is shared by all device loops (wrap it in an `Arc`).
pub struct MqttPublisher {
    client: AsyncClient,
    topic_prefix: String,
}

impl MqttPublisher {
    /// Create the client and spawn its event-loop driver task.
    ///
    /// Must be called from within a tokio runtime. The driver task keeps
    /// polling through connection errors, so a broker that is down at
    /// startup or drops out later is retried indefinitely.
    #[must_use]
    pub fn connect(config: &MqttConfig) -> Self {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        if let Some(username) = &config.username {
            options.set_credentials(username, config.password.as_deref().unwrap_or_default());
        }

        let (client, mut eventloop) = AsyncClient::new(options, 16);

        let broker = format!("{}:{}", config.host, config.port);
        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(event) => tracing::trace!(?event, "mqtt event"),
                    Err(err) => {
                        tracing::warn!(%err, broker = %broker, "mqtt connection error, retrying");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Self {
            client,
            topic_prefix: config.normalized_topic_prefix().to_string(),
        }
    }

    /// The topic a device's reports are published to.
    #[must_use]
    pub fn topic_for(&self, device_name: &str) -> String {
        format!("{}/{}/state", self.topic_prefix, device_name)
    }
}

impl TelemetryPublisher for MqttPublisher {
    fn publish_state(
        &self,
        report: &StateReport,
    ) -> impl Future<Output = Result<(), MinderError>> + Send {
        let topic = self.topic_for(&report.name);
        let payload = serde_json::to_vec(report);
        async move {
            let payload = payload
                .map_err(MqttError::PayloadSerialize)
                .map_err(MqttError::into_domain)?;
            self.client
                .publish(topic, QoS::AtMostOnce, false, payload)
                .await
                .map_err(MqttError::Client)
                .map_err(MqttError::into_domain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MqttConfig {
        serde_yaml::from_str("host: broker.local\ntopic_prefix: home/tv/").unwrap()
    }

    #[test]
    fn should_build_per_device_state_topic() {
        // Construct without connecting: topic formatting is pure.
        let publisher = MqttPublisher {
            client: AsyncClient::new(MqttOptions::new("test", "localhost", 1883), 1).0,
            topic_prefix: config().normalized_topic_prefix().to_string(),
        };
        assert_eq!(publisher.topic_for("living-room"), "home/tv/living-room/state");
    }
}
