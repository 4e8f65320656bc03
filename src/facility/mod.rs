//! OS wake facility abstraction.
//!
//! The facility is the platform mechanism that makes hardware resume from a
//! low-power state at a given time. The scheduler drives it through three
//! logical operations (schedule, cancel, list) behind a trait so tests can
//! substitute a recording implementation for the real `pmset` adapter.

mod pmset;

pub use pmset::PmsetFacility;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::core::types::WakeKind;

/// Errors that prevent a facility invocation from producing a result at all.
///
/// A tool that runs and exits non-zero is *not* an error here; that outcome
/// is reported through [`Invocation`], since a failed cancel is an expected,
/// harmless event.
#[derive(Debug, Error)]
pub enum FacilityError {
    /// The tool could not be started.
    #[error("failed to invoke wake facility: {0}")]
    Spawn(String),

    /// The tool did not complete within the allotted time.
    #[error("wake facility invocation timed out after {0:?}")]
    Timeout(Duration),
}

/// Result of one facility invocation: the exit signal plus combined
/// stdout/stderr, kept verbatim for the log.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Whether the tool exited zero.
    pub success: bool,
    /// The raw exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr.
    pub output: String,
}

impl Invocation {
    /// The captured output with surrounding whitespace removed, for log
    /// lines.
    pub fn trimmed_output(&self) -> &str {
        self.output.trim()
    }
}

/// The three operations the scheduler needs from the OS wake facility.
///
/// No retry happens at this layer: a stale cancel target is expected, and
/// retries are the caller's decision.
#[async_trait]
pub trait WakeFacility: Send + Sync {
    /// Request a wake of the given category at a facility-formatted datetime.
    async fn schedule(&self, kind: &WakeKind, datetime: &str)
        -> Result<Invocation, FacilityError>;

    /// Cancel a previously scheduled wake matching category and datetime
    /// exactly. Exits non-zero when no matching request exists.
    async fn cancel(&self, kind: &WakeKind, datetime: &str) -> Result<Invocation, FacilityError>;

    /// Dump all currently scheduled requests, for logging only.
    async fn list(&self) -> Result<Invocation, FacilityError>;
}
