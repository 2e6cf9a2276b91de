//! Per-device minder loop — poll, decide, act, report, sleep.
//!
//! One [`DeviceMinder`] runs per configured device, each in its own tokio
//! task. The minder exclusively owns its [`IdleTracker`], so device loops
//! share no mutable state and need no locking.

use std::time::Duration;

use tokio::task::JoinHandle;

use fireminder_domain::decision::{Decision, decide};
use fireminder_domain::device::DeviceConfig;
use fireminder_domain::error::MinderError;
use fireminder_domain::idle::IdleTracker;
use fireminder_domain::report::StateReport;
use fireminder_domain::snapshot::DeviceSnapshot;
use fireminder_domain::time::{Timestamp, now};

use crate::ports::{DeviceProbe, TelemetryPublisher};

/// Loop timing knobs shared by all devices.
#[derive(Debug, Clone, Copy)]
pub struct MinderSettings {
    /// Delay between poll cycles.
    pub poll_interval: Duration,
    /// Optional idle timeout after which any unchanged non-home, non-target
    /// state also triggers the target launch.
    pub idle_timeout: Option<Duration>,
}

/// The poll-decide-act loop for a single device.
pub struct DeviceMinder<P, T> {
    device: DeviceConfig,
    settings: MinderSettings,
    probe: P,
    telemetry: Option<T>,
    tracker: IdleTracker,
}

impl<P, T> DeviceMinder<P, T>
where
    P: DeviceProbe + 'static,
    T: TelemetryPublisher + 'static,
{
    /// Create a minder for one device. Telemetry is optional.
    pub fn new(
        device: DeviceConfig,
        settings: MinderSettings,
        probe: P,
        telemetry: Option<T>,
    ) -> Self {
        let tracker = IdleTracker::new(now());
        Self {
            device,
            settings,
            probe,
            telemetry,
            tracker,
        }
    }

    /// Spawn the polling loop as a background task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Continuous poll loop — runs a cycle, waits for the interval, repeats.
    async fn run(mut self) {
        tracing::info!(
            device = %self.device.name,
            host = %self.device.host,
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            idle_timeout_secs = self.settings.idle_timeout.map(|t| t.as_secs()),
            "device minder started"
        );
        loop {
            if let Err(err) = self.tick(now()).await {
                tracing::warn!(
                    %err,
                    device = %self.device.name,
                    "poll cycle failed, retrying next interval"
                );
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Run one poll cycle at the given instant.
    ///
    /// Probing errors abort the cycle before any decision is made, leaving
    /// the idle tracker untouched. Launch and telemetry failures are logged
    /// and swallowed — they never fail the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`MinderError::Probe`] when the device is unreachable or a
    /// probe command fails.
    #[tracing::instrument(skip(self, now), fields(device = %self.device.name))]
    pub async fn tick(&mut self, now: Timestamp) -> Result<StateReport, MinderError> {
        self.probe.ensure_connected().await?;

        let foreground = self.probe.foreground_package().await?;
        let media_playing = self.probe.media_playing().await?;

        let snapshot = DeviceSnapshot::derive(&self.device, foreground, media_playing, now);
        let decision = decide(&snapshot, &mut self.tracker, self.settings.idle_timeout, now);

        tracing::debug!(
            foreground = ?snapshot.foreground_package,
            media_playing = snapshot.media_playing,
            home_screen = snapshot.home_screen,
            in_target_app = snapshot.in_target_app,
            idle_seconds = self.tracker.idle_seconds(now),
            ?decision,
            "poll cycle"
        );

        if decision.is_launch() {
            tracing::info!(
                component = %self.device.target_component,
                "launching idle target app"
            );
            if let Err(err) = self.probe.launch(&self.device.target_component).await {
                tracing::warn!(%err, "failed to launch idle target app");
            }
        }

        let report = StateReport::from_cycle(
            &self.device,
            &snapshot,
            &self.tracker,
            self.settings.idle_timeout.map(|t| t.as_secs()),
            decision,
            now,
        );

        if let Some(telemetry) = &self.telemetry {
            if let Err(err) = telemetry.publish_state(&report).await {
                tracing::warn!(%err, "failed to publish state report");
            }
        }

        Ok(report)
    }

    /// The device this minder watches.
    #[must_use]
    pub fn device(&self) -> &DeviceConfig {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use fireminder_domain::report::LastAction;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    // ── Scripted probe ─────────────────────────────────────────────

    #[derive(Debug, Clone)]
    enum Cycle {
        Screen {
            foreground: Option<&'static str>,
            media_playing: bool,
        },
        Unreachable,
    }

    struct ScriptedProbe {
        cycles: Mutex<VecDeque<Cycle>>,
        launches: Mutex<Vec<String>>,
        fail_launch: bool,
    }

    impl ScriptedProbe {
        fn new(cycles: Vec<Cycle>) -> Self {
            Self {
                cycles: Mutex::new(cycles.into()),
                launches: Mutex::new(Vec::new()),
                fail_launch: false,
            }
        }

        fn current(&self) -> Cycle {
            self.cycles
                .lock()
                .unwrap()
                .front()
                .expect("script exhausted")
                .clone()
        }

        fn probe_error() -> MinderError {
            MinderError::Probe("device unreachable".into())
        }
    }

    impl DeviceProbe for ScriptedProbe {
        fn ensure_connected(&self) -> impl Future<Output = Result<(), MinderError>> + Send {
            let result = match self.current() {
                Cycle::Screen { .. } => Ok(()),
                Cycle::Unreachable => {
                    self.cycles.lock().unwrap().pop_front();
                    Err(Self::probe_error())
                }
            };
            async { result }
        }

        fn foreground_package(
            &self,
        ) -> impl Future<Output = Result<Option<String>, MinderError>> + Send {
            let result = match self.current() {
                Cycle::Screen { foreground, .. } => Ok(foreground.map(ToString::to_string)),
                Cycle::Unreachable => Err(Self::probe_error()),
            };
            async { result }
        }

        fn media_playing(&self) -> impl Future<Output = Result<bool, MinderError>> + Send {
            let result = match self.current() {
                Cycle::Screen { media_playing, .. } => {
                    self.cycles.lock().unwrap().pop_front();
                    Ok(media_playing)
                }
                Cycle::Unreachable => Err(Self::probe_error()),
            };
            async { result }
        }

        fn launch(&self, component: &str) -> impl Future<Output = Result<(), MinderError>> + Send {
            let result = if self.fail_launch {
                Err(MinderError::Probe("launch failed".into()))
            } else {
                self.launches.lock().unwrap().push(component.to_string());
                Ok(())
            };
            async { result }
        }
    }

    // ── Recording telemetry ────────────────────────────────────────

    #[derive(Default)]
    struct RecordingTelemetry {
        reports: Mutex<Vec<StateReport>>,
    }

    impl TelemetryPublisher for RecordingTelemetry {
        fn publish_state(
            &self,
            report: &StateReport,
        ) -> impl Future<Output = Result<(), MinderError>> + Send {
            self.reports.lock().unwrap().push(report.clone());
            async { Ok(()) }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn device() -> DeviceConfig {
        DeviceConfig {
            name: "living-room".to_string(),
            host: "192.168.1.40".to_string(),
            adb_port: 5555,
            home_packages: vec!["com.amazon.tv.launcher".to_string()],
            target_component: "com.example.gallery/.SlideshowActivity".to_string(),
        }
    }

    fn settings(idle_timeout: Option<Duration>) -> MinderSettings {
        MinderSettings {
            poll_interval: Duration::from_secs(5),
            idle_timeout,
        }
    }

    fn screen(foreground: &'static str, media_playing: bool) -> Cycle {
        Cycle::Screen {
            foreground: Some(foreground),
            media_playing,
        }
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_launch_target_from_quiet_home_screen() {
        let probe = ScriptedProbe::new(vec![screen("com.amazon.tv.launcher", false)]);
        let mut minder = DeviceMinder::new(
            device(),
            settings(None),
            probe,
            None::<RecordingTelemetry>,
        );

        let report = minder.tick(now()).await.unwrap();

        assert_eq!(report.last_action, LastAction::LaunchedTargetFromIdle);
        assert_eq!(report.idle_seconds, 0);
        assert_eq!(
            *minder.probe.launches.lock().unwrap(),
            vec!["com.example.gallery/.SlideshowActivity".to_string()]
        );
    }

    #[tokio::test]
    async fn should_not_launch_while_in_target_app() {
        let probe = ScriptedProbe::new(vec![screen("com.example.gallery", false)]);
        let mut minder = DeviceMinder::new(
            device(),
            settings(Some(Duration::from_secs(1))),
            probe,
            None::<RecordingTelemetry>,
        );

        let report = minder.tick(now()).await.unwrap();

        assert_eq!(report.last_action, LastAction::None);
        assert!(report.in_target_app);
        assert!(minder.probe.launches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_fire_idle_timeout_after_unchanged_state() {
        let probe = ScriptedProbe::new(vec![
            screen("com.netflix.ninja", false),
            screen("com.netflix.ninja", false),
        ]);
        let mut minder = DeviceMinder::new(
            device(),
            settings(Some(Duration::from_secs(300))),
            probe,
            None::<RecordingTelemetry>,
        );

        let t0 = now();
        let first = minder.tick(t0).await.unwrap();
        assert_eq!(first.last_action, LastAction::None);

        let t1 = t0 + TimeDelta::seconds(300);
        let second = minder.tick(t1).await.unwrap();
        assert_eq!(second.last_action, LastAction::LaunchedTargetFromIdle);
    }

    #[tokio::test]
    async fn should_skip_cycle_and_keep_tracker_on_probe_failure() {
        let probe = ScriptedProbe::new(vec![
            screen("com.netflix.ninja", false),
            Cycle::Unreachable,
            screen("com.netflix.ninja", false),
        ]);
        let mut minder = DeviceMinder::new(
            device(),
            settings(Some(Duration::from_secs(600))),
            probe,
            None::<RecordingTelemetry>,
        );

        let t0 = now();
        minder.tick(t0).await.unwrap();

        let t1 = t0 + TimeDelta::seconds(100);
        assert!(minder.tick(t1).await.is_err());

        // The failed cycle did not restart the idle clock.
        let t2 = t0 + TimeDelta::seconds(200);
        let report = minder.tick(t2).await.unwrap();
        assert_eq!(report.idle_seconds, 200);
        assert_eq!(report.last_action, LastAction::None);
    }

    #[tokio::test]
    async fn should_render_probe_detail_in_cycle_error() {
        let probe = ScriptedProbe::new(vec![Cycle::Unreachable]);
        let mut minder = DeviceMinder::new(
            device(),
            settings(None),
            probe,
            None::<RecordingTelemetry>,
        );

        // The loop logs cycle errors via Display; the transport detail must
        // show up there, not just in the source chain.
        let err = minder.tick(now()).await.unwrap_err();
        assert_eq!(err.to_string(), "device probe error: device unreachable");
    }

    #[tokio::test]
    async fn should_survive_launch_failure() {
        let mut probe = ScriptedProbe::new(vec![screen("com.amazon.tv.launcher", false)]);
        probe.fail_launch = true;
        let mut minder = DeviceMinder::new(
            device(),
            settings(None),
            probe,
            None::<RecordingTelemetry>,
        );

        let report = minder.tick(now()).await.unwrap();

        // The decision still counts as a launch even when the command fails;
        // the next cycle retries from a fresh idle clock.
        assert_eq!(report.last_action, LastAction::LaunchedTargetFromIdle);
    }

    #[tokio::test]
    async fn should_publish_state_report_after_each_cycle() {
        let probe = ScriptedProbe::new(vec![screen("com.netflix.ninja", true)]);
        let telemetry = std::sync::Arc::new(RecordingTelemetry::default());
        let mut minder = DeviceMinder::new(
            device(),
            settings(None),
            probe,
            Some(telemetry.clone()),
        );

        minder.tick(now()).await.unwrap();

        let reports = telemetry.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "living-room");
        assert_eq!(
            reports[0].foreground_package.as_deref(),
            Some("com.netflix.ninja")
        );
        assert!(reports[0].media_playing);
    }
}
