//! Idle tracker — how long a device's screen state has been unchanged.
//!
//! Each device loop owns exactly one tracker; there is no sharing and no
//! locking. The tracker keys on the `(foreground_package, media_playing)`
//! pair: as long as the pair stays the same the device counts as idle, and
//! `idle_seconds` is always `now - since`.

use crate::snapshot::DeviceSnapshot;
use crate::time::Timestamp;

/// Per-device idle state.
#[derive(Debug, Clone)]
pub struct IdleTracker {
    /// Last observed `(foreground_package, media_playing)` pair.
    pair: Option<(Option<String>, bool)>,
    /// When that pair was first observed.
    since: Timestamp,
}

impl IdleTracker {
    /// Create a tracker with nothing observed yet.
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self { pair: None, since: now }
    }

    /// Fold a snapshot into the tracker.
    ///
    /// When the `(foreground, media_playing)` pair differs from the stored
    /// one — including the very first observation — the pair is replaced and
    /// `since` restarts at the snapshot's timestamp. This alone never
    /// triggers a launch. Returns whether the pair changed.
    pub fn observe(&mut self, snapshot: &DeviceSnapshot) -> bool {
        let observed = (
            snapshot.foreground_package.clone(),
            snapshot.media_playing,
        );
        let changed = self.pair.as_ref() != Some(&observed);
        if changed {
            self.pair = Some(observed);
            self.since = snapshot.observed_at;
        }
        changed
    }

    /// Seconds the current pair has been held, relative to `now`.
    #[must_use]
    pub fn idle_seconds(&self, now: Timestamp) -> u64 {
        u64::try_from((now - self.since).num_seconds()).unwrap_or(0)
    }

    /// Restart the idle clock, e.g. right after a triggered launch.
    pub fn reset(&mut self, now: Timestamp) {
        self.since = now;
    }
}
