//! dumpsys output parsers.
//!
//! Pure functions operating on the text the `adb shell dumpsys` commands
//! print — no process handling here. The formats are not a stable API, so
//! each parser targets the one line it needs and ignores the rest:
//!
//! - window dump: `mCurrentFocus=Window{<hash> <user> <package>/<activity>}`
//! - activity dump: `mResumedActivity: ActivityRecord{<hash> <user> <package>/<activity> <task>}`
//! - media session dump: a `state=3` marker means some session is PLAYING

const CURRENT_FOCUS_MARKER: &str = "mCurrentFocus=Window{";
const RESUMED_ACTIVITY_MARKER: &str = "mResumedActivity:";

/// PLAYING marker in `dumpsys media_session` output.
const PLAYING_MARKER: &str = "state=3";

/// Extract the focused package from `dumpsys window windows` output.
///
/// Typical line:
///
/// ```text
/// mCurrentFocus=Window{29e3f28 u0 com.amazon.tv.launcher/com.amazon.tv.launcher.ui.HomeActivity}
/// ```
///
/// Returns `None` when no focused window with a `package/activity` pair is
/// present (e.g. `mCurrentFocus=null` during boot).
#[must_use]
pub fn foreground_from_window_dump(output: &str) -> Option<String> {
    for line in output.lines() {
        let Some(idx) = line.find(CURRENT_FOCUS_MARKER) else {
            continue;
        };
        let rest = &line[idx + CURRENT_FOCUS_MARKER.len()..];
        // rest: "<hash> <user> <package>/<activity>}"
        let Some(component) = rest.split_whitespace().nth(2) else {
            continue;
        };
        let component = component.trim_end_matches('}');
        if let Some((package, _activity)) = component.split_once('/') {
            if !package.is_empty() {
                return Some(package.to_string());
            }
        }
    }
    None
}

/// Extract the resumed package from `dumpsys activity activities` output.
///
/// Typical line:
///
/// ```text
/// mResumedActivity: ActivityRecord{76d2c91 u0 com.netflix.ninja/.MainActivity t17}
/// ```
#[must_use]
pub fn foreground_from_activity_dump(output: &str) -> Option<String> {
    for line in output.lines() {
        let Some(idx) = line.find(RESUMED_ACTIVITY_MARKER) else {
            continue;
        };
        let rest = &line[idx + RESUMED_ACTIVITY_MARKER.len()..];
        for token in rest.split_whitespace() {
            if let Some((package, _activity)) = token.split_once('/') {
                let package = package.rsplit('{').next().unwrap_or(package);
                if !package.is_empty() {
                    return Some(package.to_string());
                }
            }
        }
    }
    None
}

/// Whether `dumpsys media_session` output reports an actively playing
/// session. Crude but effective: `state=3` is the PLAYING playback state.
#[must_use]
pub fn media_playing_from_session_dump(output: &str) -> bool {
    output.contains(PLAYING_MARKER)
}

/// Whether adb output flags the device as unauthorized (the debugging
/// prompt on the device was never accepted).
#[must_use]
pub fn is_unauthorized(output: &str) -> bool {
    output.to_lowercase().contains("unauthorized")
}

/// Whether `adb connect` output indicates an established connection
/// (covers both `connected to …` and `already connected to …`).
#[must_use]
pub fn connect_succeeded(output: &str) -> bool {
    output.to_lowercase().contains("connected")
}

/// Whether `adb get-state` output means the device is worth talking to.
/// `unknown` and `offline` still get a chance — authorization problems are
/// surfaced later by the individual commands.
#[must_use]
pub fn device_state_ready(output: &str) -> bool {
    matches!(output.trim(), "device" | "unknown" | "offline")
}
