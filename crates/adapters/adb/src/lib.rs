//! # fireminder-adapter-adb
//!
//! ADB adapter — implements the [`DeviceProbe`] port by shelling out to the
//! external `adb` binary and parsing `dumpsys` text output.
//!
//! ## Responsibilities
//! - Keep the ADB-over-TCP connection to a device alive (`get-state` /
//!   `connect`)
//! - Read the foreground package (`dumpsys window windows`, with a
//!   `dumpsys activity activities` fallback)
//! - Read media playback state (`dumpsys media_session`)
//! - Launch the idle-target app (`am start -n`, or `monkey` for a bare
//!   package)
//! - Bound every invocation with the configured timeout and surface
//!   `unauthorized` devices with an actionable error
//!
//! ## Dependency rule
//! Depends on `fireminder-app` (port traits) and `fireminder-domain` only.

pub mod config;
pub mod error;
pub mod parser;

use std::future::Future;
use std::process::Output;

use tokio::process::Command;

use fireminder_app::ports::DeviceProbe;
use fireminder_domain::device::DeviceConfig;
use fireminder_domain::error::MinderError;

pub use config::AdbConfig;
pub use error::AdbError;

/// Captured result of one adb invocation, decoded as lossy UTF-8.
#[derive(Debug)]
struct AdbOutput {
    success: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl AdbOutput {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// stdout and stderr glued together, for markers that can show up in
    /// either stream (`unauthorized`, `connected to …`).
    fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Verify that the configured `adb` binary is runnable.
///
/// This is primarily a container-image sanity check so users get a clean
/// startup error instead of a spawn failure on the first poll.
///
/// # Errors
///
/// Returns [`AdbError::Spawn`] when the binary cannot be executed and
/// [`AdbError::NonZeroExit`] when `adb version` fails.
pub async fn ensure_adb_available(config: &AdbConfig) -> Result<(), AdbError> {
    let output = run_adb(config, &["version"], "version check").await?;
    if output.success {
        tracing::info!(binary = %config.binary, "adb binary found");
        Ok(())
    } else {
        Err(AdbError::NonZeroExit {
            context: "version check",
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// Run `adb <args…>` with the configured timeout.
async fn run_adb(
    config: &AdbConfig,
    args: &[&str],
    context: &'static str,
) -> Result<AdbOutput, AdbError> {
    let mut command = Command::new(&config.binary);
    command.args(args).kill_on_drop(true);

    let output = tokio::time::timeout(config.command_timeout(), command.output())
        .await
        .map_err(|_| AdbError::Timeout {
            context,
            seconds: config.command_timeout_secs,
        })?
        .map_err(|source| AdbError::Spawn {
            binary: config.binary.clone(),
            source,
        })?;

    Ok(AdbOutput::from_output(output))
}

/// [`DeviceProbe`] implementation backed by the external `adb` binary.
///
/// One probe per device; the serial (`host:port`) is fixed at construction.
pub struct AdbProbe {
    serial: String,
    config: AdbConfig,
}

impl AdbProbe {
    /// Create a probe for the given device.
    #[must_use]
    pub fn new(device: &DeviceConfig, config: AdbConfig) -> Self {
        Self {
            serial: device.adb_serial(),
            config,
        }
    }

    /// Run `adb -s <serial> <args…>`.
    async fn exec(&self, args: &[&str], context: &'static str) -> Result<AdbOutput, AdbError> {
        let mut full = Vec::with_capacity(args.len() + 2);
        full.push("-s");
        full.push(self.serial.as_str());
        full.extend_from_slice(args);
        run_adb(&self.config, &full, context).await
    }

    /// Run `adb -s <serial> shell <args…>`, checking for `unauthorized`.
    async fn shell(&self, args: &[&str], context: &'static str) -> Result<AdbOutput, AdbError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);
        let output = self.exec(&full, context).await?;

        if parser::is_unauthorized(&output.combined()) {
            return Err(AdbError::Unauthorized { context });
        }
        if !output.success {
            return Err(AdbError::NonZeroExit {
                context,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    async fn connect_impl(&self) -> Result<(), AdbError> {
        // A device we already talk to answers get-state; `unknown`/`offline`
        // still count — authorization problems show up on the next command.
        if let Ok(state) = self.exec(&["get-state"], "get-state").await {
            if state.success && parser::device_state_ready(&state.stdout) {
                return Ok(());
            }
        }

        tracing::debug!(serial = %self.serial, "not connected, trying adb connect");
        let output = run_adb(
            &self.config,
            &["connect", &self.serial],
            "connect",
        )
        .await?;

        let combined = output.combined();
        if parser::connect_succeeded(&combined) {
            tracing::info!(serial = %self.serial, "adb connected");
            Ok(())
        } else {
            Err(AdbError::NotConnected {
                serial: self.serial.clone(),
                detail: combined.trim().to_string(),
            })
        }
    }

    async fn foreground_impl(&self) -> Result<Option<String>, AdbError> {
        let window = self
            .shell(&["dumpsys", "window", "windows"], "window dump")
            .await?;
        if let Some(package) = parser::foreground_from_window_dump(&window.stdout) {
            return Ok(Some(package));
        }

        // Some builds leave mCurrentFocus empty; the activity dump usually
        // still knows what is resumed.
        let activity = self
            .shell(&["dumpsys", "activity", "activities"], "activity dump")
            .await?;
        Ok(parser::foreground_from_activity_dump(&activity.stdout))
    }

    async fn media_impl(&self) -> Result<bool, AdbError> {
        let session = self
            .shell(&["dumpsys", "media_session"], "media_session dump")
            .await?;
        Ok(parser::media_playing_from_session_dump(&session.stdout))
    }

    async fn launch_impl(&self, component: &str) -> Result<(), AdbError> {
        // An explicit component starts directly; a bare package goes through
        // monkey, which resolves the launcher activity for us.
        if component.contains('/') {
            self.shell(&["am", "start", "-n", component], "target app launch")
                .await?;
        } else {
            self.shell(
                &[
                    "monkey",
                    "-p",
                    component,
                    "-c",
                    "android.intent.category.LAUNCHER",
                    "1",
                ],
                "target app launch",
            )
            .await?;
        }
        Ok(())
    }
}

impl DeviceProbe for AdbProbe {
    fn ensure_connected(&self) -> impl Future<Output = Result<(), MinderError>> + Send {
        async { self.connect_impl().await.map_err(AdbError::into_domain) }
    }

    fn foreground_package(
        &self,
    ) -> impl Future<Output = Result<Option<String>, MinderError>> + Send {
        async { self.foreground_impl().await.map_err(AdbError::into_domain) }
    }

    fn media_playing(&self) -> impl Future<Output = Result<bool, MinderError>> + Send {
        async { self.media_impl().await.map_err(AdbError::into_domain) }
    }

    fn launch(&self, component: &str) -> impl Future<Output = Result<(), MinderError>> + Send {
        async move { self.launch_impl(component).await.map_err(AdbError::into_domain) }
    }
}
