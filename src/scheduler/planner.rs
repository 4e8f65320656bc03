//! Application-side schedule publishing.
//!
//! The planner is the writer half of the schedule-document contract: it asks
//! the alarm store for the next occurrence and replaces the schedule document
//! wholesale. The helper picks the change up on its next triggered run.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::core::alarm::{AlarmStore, AlarmStoreError};
use crate::core::occurrence::next_occurrence;
use crate::documents::{DocumentError, ScheduleDocument, SharedDir};

/// Format the planner writes into the schedule document's `nextWake` field.
const NEXT_WAKE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors that can occur while publishing the schedule document.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Reading the alarm list failed.
    #[error(transparent)]
    Store(#[from] AlarmStoreError),

    /// Writing the schedule document failed.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Publishes the desired next-wake state for the helper to consume.
pub struct Planner {
    dir: SharedDir,
}

impl Planner {
    /// Create a planner writing into the given shared directory.
    pub fn new(dir: SharedDir) -> Self {
        Self { dir }
    }

    /// Compute the next occurrence as of `now` and replace the schedule
    /// document: enabled with the occurrence's fields when one exists, a
    /// disabled document when no alarm will fire.
    pub async fn publish<S>(&self, store: &S, now: NaiveDateTime) -> Result<ScheduleDocument, PlannerError>
    where
        S: AlarmStore + ?Sized,
    {
        let alarms = store.all_alarms().await?;
        let document = match next_occurrence(&alarms, now) {
            Some(occurrence) => ScheduleDocument {
                enabled: true,
                next_wake: Some(occurrence.when.format(NEXT_WAKE_FORMAT).to_string()),
                alarm_time: Some(occurrence.alarm_time),
                label: Some(occurrence.label),
            },
            None => ScheduleDocument::disabled(),
        };

        self.dir.ensure_exists()?;
        self.dir.save_schedule(&document)?;
        Ok(document)
    }
}
