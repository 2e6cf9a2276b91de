//! Launch decision — the rule table at the heart of the daemon.
//!
//! Rules are evaluated in order, first match wins:
//!
//! 1. already in the target app → stay
//! 2. home screen, nothing playing → launch (home-screen idle)
//! 3. idle timeout configured and the `(foreground, media_playing)` pair has
//!    been unchanged for at least that long, off the home screen → launch
//! 4. otherwise → stay
//!
//! The tracker is advanced before the rules run, so a pair change restarts
//! the idle clock without ever triggering a launch by itself.

use std::time::Duration;

use crate::idle::IdleTracker;
use crate::snapshot::DeviceSnapshot;
use crate::time::Timestamp;

/// Why the target app is being launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchReason {
    /// The device sat on the home screen with nothing playing.
    HomeScreenIdle,
    /// A non-home, non-target app sat unchanged past the idle timeout.
    IdleTimeout,
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the device alone.
    Stay,
    /// Launch the configured idle-target app.
    Launch(LaunchReason),
}

impl Decision {
    /// Whether this decision launches the target app.
    #[must_use]
    pub fn is_launch(&self) -> bool {
        matches!(self, Self::Launch(_))
    }
}

/// Advance the idle tracker with `snapshot` and decide whether to launch.
///
/// The tracker is mutated: a pair change restarts its clock, and a launch
/// decision resets it to zero immediately (the next cycle starts fresh).
#[must_use]
pub fn decide(
    snapshot: &DeviceSnapshot,
    tracker: &mut IdleTracker,
    idle_timeout: Option<Duration>,
    now: Timestamp,
) -> Decision {
    tracker.observe(snapshot);

    if snapshot.in_target_app {
        return Decision::Stay;
    }

    if snapshot.home_screen && !snapshot.media_playing {
        tracker.reset(now);
        return Decision::Launch(LaunchReason::HomeScreenIdle);
    }

    if let Some(timeout) = idle_timeout {
        if !snapshot.home_screen && tracker.idle_seconds(now) >= timeout.as_secs() {
            tracker.reset(now);
            return Decision::Launch(LaunchReason::IdleTimeout);
        }
    }

    Decision::Stay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DEFAULT_ADB_PORT, DeviceConfig};
    use chrono::TimeDelta;

    fn device() -> DeviceConfig {
        DeviceConfig {
            name: "living-room".to_string(),
            host: "192.168.1.40".to_string(),
            adb_port: DEFAULT_ADB_PORT,
            home_packages: vec!["com.amazon.tv.launcher".to_string()],
            target_component: "com.example.gallery/.SlideshowActivity".to_string(),
        }
    }

    fn snapshot(foreground: &str, media_playing: bool, at: Timestamp) -> DeviceSnapshot {
        DeviceSnapshot::derive(&device(), Some(foreground.to_string()), media_playing, at)
    }

    #[test]
    fn should_stay_when_already_in_target_app() {
        let now = crate::time::now();
        let mut tracker = IdleTracker::new(now - TimeDelta::seconds(3600));

        let snap = snapshot("com.example.gallery", false, now);
        let decision = decide(&snap, &mut tracker, Some(Duration::from_secs(60)), now);
        assert_eq!(decision, Decision::Stay);
    }

    #[test]
    fn should_launch_immediately_from_quiet_home_screen() {
        let now = crate::time::now();
        let mut tracker = IdleTracker::new(now);

        let snap = snapshot("com.amazon.tv.launcher", false, now);
        let decision = decide(&snap, &mut tracker, None, now);
        assert_eq!(decision, Decision::Launch(LaunchReason::HomeScreenIdle));
        assert_eq!(tracker.idle_seconds(now), 0);
    }

    #[test]
    fn should_stay_on_home_screen_while_media_plays() {
        let now = crate::time::now();
        let mut tracker = IdleTracker::new(now);

        let snap = snapshot("com.amazon.tv.launcher", true, now);
        let decision = decide(&snap, &mut tracker, Some(Duration::from_secs(60)), now);
        assert_eq!(decision, Decision::Stay);
    }

    #[test]
    fn should_honor_idle_timeout_boundary() {
        let t0 = crate::time::now();
        let timeout = Some(Duration::from_secs(300));
        let mut tracker = IdleTracker::new(t0);

        let first = snapshot("com.netflix.ninja", false, t0);
        assert_eq!(decide(&first, &mut tracker, timeout, t0), Decision::Stay);

        // 299 s in: one second short, no launch.
        let t299 = t0 + TimeDelta::seconds(299);
        let held = snapshot("com.netflix.ninja", false, t299);
        assert_eq!(decide(&held, &mut tracker, timeout, t299), Decision::Stay);

        // 300 s in: the timeout fires and the clock resets.
        let t300 = t0 + TimeDelta::seconds(300);
        let held = snapshot("com.netflix.ninja", false, t300);
        assert_eq!(
            decide(&held, &mut tracker, timeout, t300),
            Decision::Launch(LaunchReason::IdleTimeout)
        );
        assert_eq!(tracker.idle_seconds(t300), 0);
    }

    #[test]
    fn should_not_fire_timeout_without_configuration() {
        let t0 = crate::time::now();
        let mut tracker = IdleTracker::new(t0);
        decide(&snapshot("com.netflix.ninja", false, t0), &mut tracker, None, t0);

        let later = t0 + TimeDelta::seconds(86_400);
        let snap = snapshot("com.netflix.ninja", false, later);
        assert_eq!(decide(&snap, &mut tracker, None, later), Decision::Stay);
    }

    #[test]
    fn should_restart_idle_clock_on_state_change_without_launching() {
        let t0 = crate::time::now();
        let timeout = Some(Duration::from_secs(300));
        let mut tracker = IdleTracker::new(t0);
        decide(&snapshot("com.netflix.ninja", false, t0), &mut tracker, timeout, t0);

        // Playback starts at 290 s — pair changes, clock restarts, no launch.
        let t290 = t0 + TimeDelta::seconds(290);
        let playing = snapshot("com.netflix.ninja", true, t290);
        assert_eq!(decide(&playing, &mut tracker, timeout, t290), Decision::Stay);

        // 299 s after the change: still short of the timeout.
        let t589 = t290 + TimeDelta::seconds(299);
        let held = snapshot("com.netflix.ninja", true, t589);
        assert_eq!(decide(&held, &mut tracker, timeout, t589), Decision::Stay);
        assert_eq!(tracker.idle_seconds(t589), 299);
    }

    #[test]
    fn should_not_fire_timeout_on_home_screen_with_media() {
        // Home screen with media playing never reaches rule 3.
        let t0 = crate::time::now();
        let timeout = Some(Duration::from_secs(60));
        let mut tracker = IdleTracker::new(t0);
        decide(&snapshot("com.amazon.tv.launcher", true, t0), &mut tracker, timeout, t0);

        let later = t0 + TimeDelta::seconds(600);
        let snap = snapshot("com.amazon.tv.launcher", true, later);
        assert_eq!(decide(&snap, &mut tracker, timeout, later), Decision::Stay);
    }

    #[test]
    fn should_report_launch_flag() {
        assert!(Decision::Launch(LaunchReason::HomeScreenIdle).is_launch());
        assert!(!Decision::Stay.is_launch());
    }
}
