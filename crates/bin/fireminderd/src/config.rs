//! Configuration loading — YAML file with environment variable overrides.
//!
//! The file path comes from `FIREMINDER_CONFIG`; without it,
//! `fireminder.yaml` in the working directory is tried. A missing file is
//! not an error — the daemon then runs in env-only mode, which is the normal
//! setup in containerized deployments. Environment variables always win over
//! file values, and an env-provided device list replaces the YAML list
//! wholesale.

use std::path::Path;

use serde::Deserialize;

use fireminder_adapter_adb::AdbConfig;
use fireminder_adapter_mqtt::MqttConfig;
use fireminder_domain::device::DeviceConfig;
use fireminder_domain::error::ValidationError;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_VAR: &str = "FIREMINDER_CONFIG";
/// Fallback config file in the working directory.
const DEFAULT_CONFIG_PATH: &str = "fireminder.yaml";
/// Prefix of the indexed per-device environment variables.
const DEVICE_VAR_PREFIX: &str = "FIREMINDER_DEVICE_";

/// Where an effective setting came from, for the startup summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Source {
    /// Built-in default.
    #[default]
    Default,
    /// The YAML config file.
    Yaml,
    /// An environment variable.
    Env,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Yaml => "yaml",
            Self::Env => "env",
        })
    }
}

/// Source of each user-visible setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sources {
    pub poll_interval: Source,
    pub idle_timeout: Source,
    pub idle_app: Source,
    pub devices: Source,
    pub mqtt: Source,
}

/// Top-level daemon configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between poll cycles, in seconds.
    pub poll_interval_seconds: u64,
    /// Optional idle timeout, in seconds.
    pub idle_timeout_seconds: Option<u64>,
    /// Optional global target override applied to every device.
    pub idle_app: Option<String>,
    /// Tracing filter directive (`RUST_LOG` syntax).
    pub log_level: String,
    /// Devices to watch.
    pub devices: Vec<DeviceConfig>,
    /// Optional MQTT telemetry settings.
    pub mqtt: Option<MqttConfig>,
    /// ADB invocation settings.
    pub adb: AdbConfig,
    /// Where each setting came from. Not part of the file format.
    #[serde(skip)]
    pub sources: Sources,
    /// Notes produced while loading, before the tracing subscriber exists.
    /// Replayed by [`Config::log_summary`] once logging is up.
    #[serde(skip)]
    pub startup_notes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 5,
            idle_timeout_seconds: None,
            idle_app: None,
            log_level: "fireminderd=info,fireminder=info".to_string(),
            devices: Vec::new(),
            mqtt: None,
            adb: AdbConfig::default(),
            sources: Sources::default(),
            startup_notes: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the YAML file (if present), apply environment
    /// overrides, and validate.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is malformed, an environment variable
    /// does not parse, or validation fails. A missing file is fine.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit_path = std::env::var(CONFIG_PATH_VAR).ok();
        let path = explicit_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut config = Self::from_file(Path::new(path))?;
        config.apply_env(std::env::vars())?;
        config.finalize()?;
        Ok(config)
    }

    /// Load runs before the tracing subscriber is installed, so fallback
    /// messages are buffered as startup notes instead of logged here.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.is_dir() {
            // A mounted config *directory* is a common container mishap.
            let mut config = Self::default();
            config.startup_notes.push(format!(
                "config path {} is a directory, running env-only",
                path.display()
            ));
            return Ok(config);
        }
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.startup_notes.push(format!(
                    "config file {} not found, running env-only",
                    path.display()
                ));
                Ok(config)
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Parse a YAML document, marking the file-provided fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        // serde fills defaults silently; recover which fields the file set
        // so the startup summary can say so.
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        let has = |key: &str| raw.get(key).is_some_and(|v| !v.is_null());
        if has("poll_interval_seconds") {
            config.sources.poll_interval = Source::Yaml;
        }
        if has("idle_timeout_seconds") {
            config.sources.idle_timeout = Source::Yaml;
        }
        if has("idle_app") {
            config.sources.idle_app = Source::Yaml;
        }
        if has("devices") {
            config.sources.devices = Source::Yaml;
        }
        if has("mqtt") {
            config.sources.mqtt = Source::Yaml;
        }
        Ok(config)
    }

    /// Apply environment overrides from the given variable set.
    ///
    /// Taking the variables as an argument keeps this testable without
    /// mutating process-global state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a variable's value does not parse.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let get = |name: &str| {
            vars.iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        if let Some(value) = get("FIREMINDER_POLL_INTERVAL") {
            self.poll_interval_seconds = parse_positive(value, "FIREMINDER_POLL_INTERVAL")?;
            self.sources.poll_interval = Source::Env;
        }
        if let Some(value) = get("FIREMINDER_IDLE_TIMEOUT") {
            self.idle_timeout_seconds = Some(parse_positive(value, "FIREMINDER_IDLE_TIMEOUT")?);
            self.sources.idle_timeout = Source::Env;
        }
        if let Some(value) = get("FIREMINDER_APP") {
            self.idle_app = Some(value.to_string());
            self.sources.idle_app = Source::Env;
        }
        if let Some(value) = get("FIREMINDER_LOG") {
            self.log_level = value.to_string();
        }
        if let Some(value) = get("RUST_LOG") {
            self.log_level = value.to_string();
        }

        self.apply_env_mqtt(&get)?;

        let env_devices = collect_env_devices(&vars)?;
        if !env_devices.is_empty() {
            self.devices = env_devices;
            self.sources.devices = Source::Env;
        }

        Ok(())
    }

    fn apply_env_mqtt<'a, F>(&mut self, get: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let enabled = get("FIREMINDER_MQTT_ENABLED")
            .map(|value| parse_bool(value, "FIREMINDER_MQTT_ENABLED"))
            .transpose()?;

        if enabled == Some(false) {
            self.mqtt = None;
            self.sources.mqtt = Source::Env;
            return Ok(());
        }

        let host = get("FIREMINDER_MQTT_HOST");
        let port = get("FIREMINDER_MQTT_PORT")
            .map(|value| parse_port(value, "FIREMINDER_MQTT_PORT"))
            .transpose()?;
        let topic_prefix = get("FIREMINDER_MQTT_TOPIC_PREFIX");
        let username = get("FIREMINDER_MQTT_USERNAME");
        let password = get("FIREMINDER_MQTT_PASSWORD");

        let any_set = enabled == Some(true)
            || host.is_some()
            || port.is_some()
            || topic_prefix.is_some()
            || username.is_some()
            || password.is_some();
        if !any_set {
            return Ok(());
        }

        let mut mqtt = self.mqtt.take().unwrap_or_else(|| MqttConfig::for_host(""));
        if let Some(host) = host {
            mqtt.host = host.to_string();
        }
        if let Some(port) = port {
            mqtt.port = port;
        }
        if let Some(prefix) = topic_prefix {
            mqtt.topic_prefix = prefix.to_string();
        }
        if let Some(username) = username {
            mqtt.username = Some(username.to_string());
        }
        if let Some(password) = password {
            mqtt.password = Some(password.to_string());
        }
        self.mqtt = Some(mqtt);
        self.sources.mqtt = Source::Env;
        Ok(())
    }

    /// Apply the global target override and check all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] or [`ConfigError::Device`] for
    /// anything the daemon cannot start with.
    pub fn finalize(&mut self) -> Result<(), ConfigError> {
        if let Some(app) = &self.idle_app {
            if app.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "idle_app must not be empty when set".to_string(),
                ));
            }
            for device in &mut self.devices {
                device.target_component = app.clone();
            }
        }

        if self.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_seconds must be a positive integer".to_string(),
            ));
        }
        if self.idle_timeout_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "idle_timeout_seconds, if set, must be a positive integer".to_string(),
            ));
        }
        if self.devices.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one device must be configured".to_string(),
            ));
        }
        for device in &self.devices {
            device.validate()?;
        }
        if let Some(mqtt) = &self.mqtt {
            if mqtt.host.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "mqtt.host must be a non-empty string".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Log the effective configuration and where each piece came from.
    /// Also replays any notes buffered during loading.
    pub fn log_summary(&self) {
        for note in &self.startup_notes {
            tracing::warn!("{note}");
        }
        let names: Vec<&str> = self.devices.iter().map(|d| d.name.as_str()).collect();
        tracing::info!(
            poll_interval_seconds = self.poll_interval_seconds,
            poll_interval_source = %self.sources.poll_interval,
            idle_timeout_seconds = self.idle_timeout_seconds,
            idle_timeout_source = %self.sources.idle_timeout,
            devices = ?names,
            devices_source = %self.sources.devices,
            mqtt_enabled = self.mqtt.is_some(),
            mqtt_source = %self.sources.mqtt,
            idle_app = self.idle_app.as_deref(),
            idle_app_source = %self.sources.idle_app,
            "configuration loaded"
        );
    }
}

/// Build the device list from indexed `FIREMINDER_DEVICE_<n>_*` variables.
fn collect_env_devices(vars: &[(String, String)]) -> Result<Vec<DeviceConfig>, ConfigError> {
    #[derive(Default)]
    struct RawDevice {
        name: Option<String>,
        host: Option<String>,
        target: Option<String>,
        port: Option<u16>,
    }

    let mut raw: std::collections::BTreeMap<u32, RawDevice> = std::collections::BTreeMap::new();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(DEVICE_VAR_PREFIX) else {
            continue;
        };
        let Some((index, field)) = rest.split_once('_') else {
            continue;
        };
        let Ok(index) = index.parse::<u32>() else {
            continue;
        };
        let entry = raw.entry(index).or_default();
        match field {
            "NAME" => entry.name = Some(value.clone()),
            "HOST" | "IP" => entry.host = Some(value.clone()),
            "TARGET" => entry.target = Some(value.clone()),
            "PORT" => {
                entry.port = Some(parse_port(value, key)?);
            }
            _ => {}
        }
    }

    let mut devices = Vec::with_capacity(raw.len());
    for (index, entry) in raw {
        let (Some(host), Some(target)) = (entry.host, entry.target) else {
            return Err(ConfigError::Env {
                var: format!("{DEVICE_VAR_PREFIX}{index}_*"),
                reason: "env devices require both HOST and TARGET".to_string(),
            });
        };
        devices.push(DeviceConfig {
            name: entry.name.unwrap_or_else(|| format!("device_{index}")),
            host,
            adb_port: entry.port.unwrap_or(fireminder_domain::device::DEFAULT_ADB_PORT),
            home_packages: fireminder_domain::device::DEFAULT_HOME_PACKAGES
                .iter()
                .map(ToString::to_string)
                .collect(),
            target_component: target,
        });
    }
    Ok(devices)
}

fn parse_positive(value: &str, var: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Env {
            var: var.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

fn parse_port(value: &str, var: &str) -> Result<u16, ConfigError> {
    match value.parse::<u16>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Env {
            var: var.to_string(),
            reason: "must be a valid port number".to_string(),
        }),
    }
}

fn parse_bool(value: &str, var: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            var: var.to_string(),
            reason: "must be one of: 1, 0, true, false, yes, no, on, off".to_string(),
        }),
    }
}

/// Configuration errors. All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// YAML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] serde_yaml::Error),
    /// File I/O failure (other than a missing file).
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// An environment variable holds an unusable value.
    #[error("invalid environment variable {var}: {reason}")]
    Env {
        /// The offending variable name.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A device failed domain validation.
    #[error("invalid device configuration")]
    Device(#[from] ValidationError),
}
