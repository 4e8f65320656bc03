//! Testing utilities for users of the reveil library.
//!
//! Provides [`RecordingFacility`], a wake facility that records every call
//! and can be scripted to fail, so reconciliation logic can be exercised
//! without touching `pmset`.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::core::types::WakeKind;
use crate::facility::{FacilityError, Invocation, WakeFacility};

/// One recorded facility call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityCall {
    /// A schedule request.
    Schedule { kind: String, datetime: String },
    /// A cancel request.
    Cancel { kind: String, datetime: String },
    /// A listing request.
    List,
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<FacilityCall>,
    schedule_failure: Option<String>,
    cancel_failure: Option<String>,
    listing: String,
}

/// A wake facility for tests: records calls, succeeds by default, and can be
/// told to fail individual operations.
///
/// Cloning yields a handle to the same recording, so a test can keep one
/// while handing the other to a reconciler.
#[derive(Clone, Default)]
pub struct RecordingFacility {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingFacility {
    /// Create a facility where every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<FacilityCall> {
        self.state.lock().expect("lock poisoned").calls.clone()
    }

    /// Make subsequent schedule calls exit non-zero with the given output.
    pub fn fail_schedule(&self, diagnostic: impl Into<String>) {
        self.state.lock().expect("lock poisoned").schedule_failure = Some(diagnostic.into());
    }

    /// Make subsequent cancel calls exit non-zero with the given output
    /// (the "no matching request" case).
    pub fn fail_cancel(&self, diagnostic: impl Into<String>) {
        self.state.lock().expect("lock poisoned").cancel_failure = Some(diagnostic.into());
    }

    /// Set the text returned by list calls.
    pub fn set_listing(&self, listing: impl Into<String>) {
        self.state.lock().expect("lock poisoned").listing = listing.into();
    }

    fn record(&self, call: FacilityCall) {
        self.state.lock().expect("lock poisoned").calls.push(call);
    }

    fn ok(output: impl Into<String>) -> Invocation {
        Invocation {
            success: true,
            exit_code: Some(0),
            output: output.into(),
        }
    }

    fn failed(output: String) -> Invocation {
        Invocation {
            success: false,
            exit_code: Some(1),
            output,
        }
    }
}

#[async_trait]
impl WakeFacility for RecordingFacility {
    async fn schedule(
        &self,
        kind: &WakeKind,
        datetime: &str,
    ) -> Result<Invocation, FacilityError> {
        self.record(FacilityCall::Schedule {
            kind: kind.as_str().to_string(),
            datetime: datetime.to_string(),
        });
        let failure = self
            .state
            .lock()
            .expect("lock poisoned")
            .schedule_failure
            .clone();
        Ok(match failure {
            Some(diagnostic) => Self::failed(diagnostic),
            None => Self::ok(""),
        })
    }

    async fn cancel(&self, kind: &WakeKind, datetime: &str) -> Result<Invocation, FacilityError> {
        self.record(FacilityCall::Cancel {
            kind: kind.as_str().to_string(),
            datetime: datetime.to_string(),
        });
        let failure = self
            .state
            .lock()
            .expect("lock poisoned")
            .cancel_failure
            .clone();
        Ok(match failure {
            Some(diagnostic) => Self::failed(diagnostic),
            None => Self::ok(""),
        })
    }

    async fn list(&self) -> Result<Invocation, FacilityError> {
        self.record(FacilityCall::List);
        let listing = self.state.lock().expect("lock poisoned").listing.clone();
        Ok(Self::ok(listing))
    }
}
