//! State report — the per-device telemetry payload.

use serde::Serialize;

use crate::decision::Decision;
use crate::device::DeviceConfig;
use crate::idle::IdleTracker;
use crate::snapshot::DeviceSnapshot;
use crate::time::Timestamp;

/// What the daemon did this cycle, as reported over telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LastAction {
    /// Nothing was launched.
    None,
    /// The idle-target app was launched.
    LaunchedTargetFromIdle,
}

impl From<Decision> for LastAction {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Stay => Self::None,
            Decision::Launch(_) => Self::LaunchedTargetFromIdle,
        }
    }
}

/// JSON payload published to `<topic_prefix>/<name>/state` after each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateReport {
    /// Device name.
    pub name: String,
    /// Device host.
    pub host: String,
    /// Foreground package, `null` when undetermined.
    pub foreground_package: Option<String>,
    /// Whether any media session was playing.
    pub media_playing: bool,
    /// Whether the foreground was a home launcher.
    pub home_screen: bool,
    /// Whether the foreground was the idle-target app.
    pub in_target_app: bool,
    /// Seconds the `(foreground, media_playing)` pair has been held.
    pub idle_seconds: u64,
    /// Configured idle timeout, `null` when disabled.
    pub idle_timeout_seconds: Option<u64>,
    /// What the daemon did this cycle.
    pub last_action: LastAction,
}

impl StateReport {
    /// Assemble a report for one completed poll cycle.
    #[must_use]
    pub fn from_cycle(
        device: &DeviceConfig,
        snapshot: &DeviceSnapshot,
        tracker: &IdleTracker,
        idle_timeout_seconds: Option<u64>,
        decision: Decision,
        now: Timestamp,
    ) -> Self {
        Self {
            name: device.name.clone(),
            host: device.host.clone(),
            foreground_package: snapshot.foreground_package.clone(),
            media_playing: snapshot.media_playing,
            home_screen: snapshot.home_screen,
            in_target_app: snapshot.in_target_app,
            idle_seconds: tracker.idle_seconds(now),
            idle_timeout_seconds,
            last_action: decision.into(),
        }
    }
}
