//! The wake reconciler.
//!
//! One invocation brings the OS's single outstanding wake request into
//! agreement with the schedule document, using the helper state document as
//! the source of truth for what is currently outstanding. The facility's own
//! listing is only consulted for diagnostic logging at the end, never for
//! reconciliation.
//!
//! Every step is best-effort: failures are logged and the run continues,
//! except for the two parse failures (schedule document, wake datetime)
//! which legitimately leave nothing further to do. The run itself never
//! fails; callers receive a [`RunReport`] describing what happened.

use chrono::{Duration, Local, NaiveDateTime};

use crate::core::datetime;
use crate::core::types::WakeKind;
use crate::documents::SharedDir;
use crate::facility::WakeFacility;
use crate::logsink::LogSink;

/// Seconds subtracted from the desired alarm time when requesting the wake,
/// so the hardware is fully resumed before the in-app timer observes the new
/// minute boundary.
const LEAD_TIME_SECS: i64 = 60;

/// How a reconciliation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A new wake was scheduled and recorded.
    Scheduled,
    /// No schedule document exists.
    NoSchedule,
    /// The schedule document could not be parsed.
    InvalidDocument,
    /// The schedule document is disabled.
    Disabled,
    /// The schedule document carries no wake time.
    NoWakeTime,
    /// The wake datetime could not be parsed.
    InvalidDatetime,
    /// The computed request time had already elapsed.
    InPast,
    /// The facility rejected or failed the schedule operation.
    ScheduleFailed,
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Terminal state of the run.
    pub outcome: RunOutcome,
    /// Facility datetime of the previously outstanding wake this run
    /// cancelled, if any.
    pub cancelled: Option<String>,
    /// Facility datetime of the wake this run scheduled, if any.
    pub scheduled: Option<String>,
}

impl RunReport {
    fn new(outcome: RunOutcome, cancelled: Option<String>) -> Self {
        Self {
            outcome,
            cancelled,
            scheduled: None,
        }
    }
}

/// Reconciles the schedule document against the OS wake facility.
pub struct WakeReconciler<F: WakeFacility> {
    dir: SharedDir,
    facility: F,
    log: LogSink,
}

impl<F: WakeFacility> WakeReconciler<F> {
    /// Create a reconciler over the given shared directory and facility.
    /// The log sink writes to the directory's standard log file.
    pub fn new(dir: SharedDir, facility: F) -> Self {
        let log = LogSink::new(dir.log_path());
        Self { dir, facility, log }
    }

    /// Replace the log sink (testing, alternate log locations).
    pub fn with_log_sink(mut self, log: LogSink) -> Self {
        self.log = log;
        self
    }

    /// Run one reconciliation pass against the local wall clock.
    pub async fn run(&self) -> RunReport {
        self.run_at(Local::now().naive_local()).await
    }

    /// Run one reconciliation pass, evaluating the past-time guard against
    /// an explicit `now`.
    pub async fn run_at(&self, now: NaiveDateTime) -> RunReport {
        self.log.append("========================================");
        self.log.append("Wake helper started");

        // Shared directory must exist before any document access; newly
        // created, it is made world-writable so the unprivileged app can
        // hand over the schedule document.
        match self.dir.ensure_exists() {
            Ok(true) => self
                .log
                .append(&format!("Created shared directory {}", self.dir.root().display())),
            Ok(false) => {}
            Err(e) => self
                .log
                .append(&format!("Error creating shared directory: {}", e)),
        }

        let mut state = self.dir.load_state();

        // Cancel whatever we previously asked for, then immediately persist
        // "no known outstanding wake". If anything later fails or the
        // process dies, stale state must never claim a wake that might not
        // exist.
        let outstanding = state
            .outstanding()
            .map(|(kind, wake)| (kind, wake.to_string()));
        let cancelled = match outstanding {
            Some((kind, wake)) => {
                self.cancel_previous(&kind, &wake).await;
                state.clear();
                Some(wake)
            }
            None => None,
        };
        if let Err(e) = self.dir.save_state(&state) {
            self.log.append(&format!("Error persisting state: {}", e));
        }

        let document = match self.dir.load_schedule() {
            Ok(Some(document)) => document,
            Ok(None) => {
                self.log.append(&format!(
                    "No schedule document at {}",
                    self.dir.schedule_path().display()
                ));
                self.log.append("Done (no schedule)");
                return RunReport::new(RunOutcome::NoSchedule, cancelled);
            }
            Err(e) => {
                self.log.append(&format!("Invalid schedule document: {}", e));
                return RunReport::new(RunOutcome::InvalidDocument, cancelled);
            }
        };

        if !document.enabled {
            self.log.append("Schedule is disabled");
            self.log.append("Done (disabled)");
            return RunReport::new(RunOutcome::Disabled, cancelled);
        }

        let next_wake = match &document.next_wake {
            Some(next_wake) => next_wake.clone(),
            None => {
                self.log.append("No next wake time in schedule");
                return RunReport::new(RunOutcome::NoWakeTime, cancelled);
            }
        };

        let wake_at = match datetime::parse_local(&next_wake) {
            Ok(wake_at) => wake_at,
            Err(_) => {
                self.log
                    .append(&format!("Invalid datetime format: {}", next_wake));
                return RunReport::new(RunOutcome::InvalidDatetime, cancelled);
            }
        };

        // Ask for the wake one lead time early.
        let request_at = wake_at - Duration::seconds(LEAD_TIME_SECS);

        if request_at <= now {
            self.log
                .append(&format!("Wake time is in the past: {}", next_wake));
            return RunReport::new(RunOutcome::InPast, cancelled);
        }

        let kind = WakeKind::wake_or_power_on();
        let facility_datetime = datetime::format_for_facility(request_at);

        let mut report = RunReport::new(RunOutcome::ScheduleFailed, cancelled);
        match self.facility.schedule(&kind, &facility_datetime).await {
            Ok(result) if result.success => {
                state.record(&kind, facility_datetime.clone());
                if let Err(e) = self.dir.save_state(&state) {
                    self.log.append(&format!("Error persisting state: {}", e));
                }

                let label = document
                    .label
                    .as_deref()
                    .or(document.alarm_time.as_deref())
                    .unwrap_or("alarm");
                let at = document.alarm_time.as_deref().unwrap_or(&next_wake);
                self.log.append(&format!(
                    "Wake scheduled for {} (alarm: {} at {})",
                    facility_datetime, label, at
                ));

                report.outcome = RunOutcome::Scheduled;
                report.scheduled = Some(facility_datetime);
            }
            Ok(result) => {
                self.log
                    .append(&format!("Schedule failed: {}", result.trimmed_output()));
            }
            Err(e) => {
                self.log.append(&format!("Error scheduling wake: {}", e));
            }
        }

        self.log_facility_listing().await;
        self.log.append("Done");
        report
    }

    /// Cancel the wake the state document names. The target may already be
    /// gone (it fired, or was cleared out-of-band); that failure is logged
    /// and ignored.
    async fn cancel_previous(&self, kind: &WakeKind, wake: &str) {
        match self.facility.cancel(kind, wake).await {
            Ok(result) if result.success => {
                self.log
                    .append(&format!("Cancelled wake event: {} {}", kind, wake));
            }
            Ok(result) => {
                self.log.append(&format!(
                    "Cancel failed (may not exist): {} {} - {}",
                    kind,
                    wake,
                    result.trimmed_output()
                ));
            }
            Err(e) => {
                self.log.append(&format!("Error cancelling wake: {}", e));
            }
        }
    }

    /// Log the facility's full listing verbatim, for postmortem debugging.
    /// Never parsed, never reconciled against.
    async fn log_facility_listing(&self) {
        match self.facility.list().await {
            Ok(result) => self
                .log
                .append(&format!("Current facility schedule:\n{}", result.output)),
            Err(e) => self
                .log
                .append(&format!("Error listing scheduled wakes: {}", e)),
        }
    }
}
