//! reveil: alarm wake-schedule reconciliation.
//!
//! An alarm application computes when the machine should next be woken; a
//! privileged helper process (`reveil-helper`) converts that desired state
//! into a single outstanding OS wake request via `pmset`, and keeps exactly
//! one such request consistent with the latest desired state across
//! restarts, missed invocations, and crashes.
//!
//! The two processes communicate through JSON documents in a shared
//! directory, each replaced wholesale on write:
//!
//! - the application publishes `schedule.json` (see [`Planner`]);
//! - the helper reconciles it against `pmset` (see [`WakeReconciler`]),
//!   records what it did in `state.json`, and appends to `helper.log`.

pub mod config;
pub mod core;
pub mod documents;
pub mod facility;
pub mod logsink;
pub mod scheduler;
pub mod testing;

pub use crate::core::alarm::{Alarm, AlarmStore, AlarmStoreError, InMemoryAlarmStore};
pub use crate::core::occurrence::{next_occurrence, Occurrence};
pub use crate::core::types::{AlarmId, WakeKind};
pub use config::{ConfigError, HelperConfig};
pub use documents::{DocumentError, HelperState, ScheduleDocument, SharedDir};
pub use facility::{FacilityError, Invocation, PmsetFacility, WakeFacility};
pub use logsink::LogSink;
pub use scheduler::{Planner, PlannerError, RunOutcome, RunReport, WakeReconciler};
