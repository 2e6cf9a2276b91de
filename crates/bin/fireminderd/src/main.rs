//! # fireminderd — fireminder daemon
//!
//! Composition root that wires all adapters together and runs the per-device
//! minder loops.
//!
//! ## Responsibilities
//! - Load configuration (YAML file + environment variable overrides)
//! - Initialize tracing
//! - Sanity-check the external `adb` binary
//! - Construct the MQTT publisher (when configured) and one ADB probe per
//!   device
//! - Spawn one [`DeviceMinder`] task per device
//! - Wait for ctrl-c and shut down
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use fireminder_adapter_adb::{AdbProbe, ensure_adb_available};
use fireminder_adapter_mqtt::MqttPublisher;
use fireminder_app::minder::{DeviceMinder, MinderSettings};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level)?)
        .init();

    config.log_summary();

    ensure_adb_available(&config.adb).await?;

    let telemetry = config.mqtt.as_ref().map(|mqtt| {
        tracing::info!(
            broker = %mqtt.host,
            port = mqtt.port,
            topic_prefix = %mqtt.normalized_topic_prefix(),
            "mqtt telemetry enabled"
        );
        Arc::new(MqttPublisher::connect(mqtt))
    });

    let settings = MinderSettings {
        poll_interval: Duration::from_secs(config.poll_interval_seconds),
        idle_timeout: config.idle_timeout_seconds.map(Duration::from_secs),
    };

    let handles: Vec<_> = config
        .devices
        .iter()
        .map(|device| {
            let probe = AdbProbe::new(device, config.adb.clone());
            DeviceMinder::new(device.clone(), settings, probe, telemetry.clone()).start()
        })
        .collect();

    tracing::info!(devices = handles.len(), "fireminder running");

    tokio::signal::ctrl_c().await?;
    tracing::info!("ctrl-c received, shutting down");

    for handle in handles {
        handle.abort();
    }

    Ok(())
}
