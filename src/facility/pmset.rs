//! `pmset` subprocess adapter.
//!
//! Translates the facility operations into invocations of the macOS power
//! management tool:
//!
//! - schedule: `pmset schedule wakeorpoweron "MM/DD/YYYY HH:MM:SS"`
//! - cancel:   `pmset schedule cancel wakeorpoweron "MM/DD/YYYY HH:MM:SS"`
//! - list:     `pmset -g sched`
//!
//! `pmset` is a quick, local, non-interactive command; a hang is treated as a
//! failure via a short timeout rather than waited out.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::{FacilityError, Invocation, WakeFacility};
use crate::core::types::WakeKind;

/// Default location of the pmset binary.
const PMSET_PATH: &str = "/usr/bin/pmset";

/// Default ceiling on a single invocation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Wake facility backed by the `pmset` command-line tool.
#[derive(Debug, Clone)]
pub struct PmsetFacility {
    program: PathBuf,
    timeout: Duration,
}

impl PmsetFacility {
    /// Create an adapter using the system pmset binary.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(PMSET_PATH),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different executable in place of pmset.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the tool with the given arguments, capturing combined output.
    async fn run(&self, args: &[&str]) -> Result<Invocation, FacilityError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| FacilityError::Timeout(self.timeout))?
            .map_err(|e| FacilityError::Spawn(e.to_string()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(Invocation {
            success: output.status.success(),
            exit_code: output.status.code(),
            output: combined,
        })
    }
}

impl Default for PmsetFacility {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WakeFacility for PmsetFacility {
    async fn schedule(
        &self,
        kind: &WakeKind,
        datetime: &str,
    ) -> Result<Invocation, FacilityError> {
        self.run(&["schedule", kind.as_str(), datetime]).await
    }

    async fn cancel(&self, kind: &WakeKind, datetime: &str) -> Result<Invocation, FacilityError> {
        self.run(&["schedule", "cancel", kind.as_str(), datetime])
            .await
    }

    async fn list(&self) -> Result<Invocation, FacilityError> {
        self.run(&["-g", "sched"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind() -> WakeKind {
        WakeKind::wake_or_power_on()
    }

    #[tokio::test]
    async fn test_successful_invocation_captures_output() {
        // echo stands in for pmset: it prints its arguments and exits zero.
        let facility = PmsetFacility::new().with_program("echo");

        let result = facility.schedule(&kind(), "02/12/2026 06:59:00").await.unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(
            result.trimmed_output(),
            "schedule wakeorpoweron 02/12/2026 06:59:00"
        );
    }

    #[tokio::test]
    async fn test_cancel_argument_order() {
        let facility = PmsetFacility::new().with_program("echo");

        let result = facility.cancel(&kind(), "02/12/2026 06:59:00").await.unwrap();

        assert_eq!(
            result.trimmed_output(),
            "schedule cancel wakeorpoweron 02/12/2026 06:59:00"
        );
    }

    #[tokio::test]
    async fn test_list_arguments() {
        let facility = PmsetFacility::new().with_program("echo");

        let result = facility.list().await.unwrap();

        assert_eq!(result.trimmed_output(), "-g sched");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_error() {
        // `false` ignores its arguments and exits 1.
        let facility = PmsetFacility::new().with_program("false");

        let result = facility.schedule(&kind(), "02/12/2026 06:59:00").await.unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let facility = PmsetFacility::new().with_program("/nonexistent/pmset");

        let result = facility.list().await;

        assert!(matches!(result, Err(FacilityError::Spawn(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_tool_times_out() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        // A stand-in tool that never finishes.
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("slow-pmset");
        {
            let mut file = std::fs::File::create(&script).unwrap();
            writeln!(file, "#!/bin/sh\nsleep 30").unwrap();
        }
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let facility = PmsetFacility::new()
            .with_program(&script)
            .with_timeout(Duration::from_millis(100));

        let result = facility.list().await;

        assert!(matches!(result, Err(FacilityError::Timeout(_))));
    }
}
