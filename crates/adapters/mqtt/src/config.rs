//! MQTT telemetry configuration.

use serde::Deserialize;

/// Configuration for the MQTT telemetry publisher.
///
/// Only the broker host is required; everything else has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub host: String,
    /// MQTT broker port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Topic prefix; reports go to `<topic_prefix>/<device_name>/state`.
    /// A trailing slash is stripped.
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
    /// Optional broker username.
    #[serde(default)]
    pub username: Option<String>,
    /// Optional broker password (ignored without a username).
    #[serde(default)]
    pub password: Option<String>,
    /// MQTT client identifier.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u16,
}

fn default_port() -> u16 {
    1883
}

fn default_topic_prefix() -> String {
    "home/firestick".to_string()
}

fn default_client_id() -> String {
    "fireminder".to_string()
}

fn default_keep_alive_secs() -> u16 {
    30
}

impl MqttConfig {
    /// A config with all defaults around the given host. Used when MQTT is
    /// configured purely through environment variables.
    #[must_use]
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            topic_prefix: default_topic_prefix(),
            username: None,
            password: None,
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }

    /// The topic prefix without any trailing slash.
    #[must_use]
    pub fn normalized_topic_prefix(&self) -> &str {
        self.topic_prefix.trim_end_matches('/')
    }
}
