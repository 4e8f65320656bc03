//! Alarm records and the alarm store abstraction.
//!
//! The wake scheduler only ever *reads* alarms: the application owns the full
//! CRUD surface. This module models the read side: the record fields the
//! occurrence calculation needs, plus a trait-based store with an in-memory
//! backend.

use async_trait::async_trait;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

use super::types::AlarmId;

/// Errors that can occur when reading from an alarm store.
#[derive(Debug, Error)]
pub enum AlarmStoreError {
    /// The requested alarm was not found.
    #[error("not found: alarm {0}")]
    NotFound(AlarmId),

    /// Store lock was poisoned.
    #[error("alarm store lock poisoned")]
    LockPoisoned,

    /// Generic store error.
    #[error("alarm store error: {0}")]
    Other(String),
}

/// A single alarm record, as the scheduler sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    /// Unique alarm identifier.
    pub id: AlarmId,
    /// Time of day the alarm rings.
    pub time: NaiveTime,
    /// Human-readable label.
    pub label: String,
    /// Whether the alarm is active.
    pub enabled: bool,
    /// Days of the week the alarm repeats on. An alarm with no days never
    /// fires.
    pub days: Vec<Weekday>,
}

impl Alarm {
    /// Create a new enabled alarm at the given time of day.
    pub fn new(time: NaiveTime) -> Self {
        Self {
            id: AlarmId::new(),
            time,
            label: String::new(),
            enabled: true,
            days: Vec::new(),
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the repeat days.
    pub fn with_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.days = days.into_iter().collect();
        self
    }

    /// Set enabled status.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The alarm time as the `HH:MM` display string used in the schedule
    /// document and log lines.
    pub fn display_time(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// Whether this alarm can ever fire.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.days.is_empty()
    }
}

/// Read-only view of the application's alarm list.
#[async_trait]
pub trait AlarmStore: Send + Sync {
    /// List all alarms, sorted by time of day.
    async fn all_alarms(&self) -> Result<Vec<Alarm>, AlarmStoreError>;

    /// Get a single alarm by id.
    async fn alarm(&self, id: &AlarmId) -> Result<Alarm, AlarmStoreError>;
}

/// In-memory alarm store backend.
///
/// Thread-safe via RwLock. Used by the planner in tests and by embedders that
/// hold the alarm list in memory.
pub struct InMemoryAlarmStore {
    alarms: RwLock<HashMap<AlarmId, Alarm>>,
}

impl InMemoryAlarmStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            alarms: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with the given alarms.
    pub fn with_alarms(alarms: impl IntoIterator<Item = Alarm>) -> Self {
        let map = alarms.into_iter().map(|a| (a.id, a)).collect();
        Self {
            alarms: RwLock::new(map),
        }
    }

    /// Insert or replace an alarm.
    pub fn upsert(&self, alarm: Alarm) -> Result<(), AlarmStoreError> {
        let mut alarms = self
            .alarms
            .write()
            .map_err(|_| AlarmStoreError::LockPoisoned)?;
        alarms.insert(alarm.id, alarm);
        Ok(())
    }

    /// Remove an alarm.
    pub fn remove(&self, id: &AlarmId) -> Result<(), AlarmStoreError> {
        let mut alarms = self
            .alarms
            .write()
            .map_err(|_| AlarmStoreError::LockPoisoned)?;
        alarms.remove(id).ok_or(AlarmStoreError::NotFound(*id))?;
        Ok(())
    }
}

impl Default for InMemoryAlarmStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlarmStore for InMemoryAlarmStore {
    async fn all_alarms(&self) -> Result<Vec<Alarm>, AlarmStoreError> {
        let alarms = self
            .alarms
            .read()
            .map_err(|_| AlarmStoreError::LockPoisoned)?;
        let mut result: Vec<_> = alarms.values().cloned().collect();
        result.sort_by_key(|a| a.time);
        Ok(result)
    }

    async fn alarm(&self, id: &AlarmId) -> Result<Alarm, AlarmStoreError> {
        let alarms = self
            .alarms
            .read()
            .map_err(|_| AlarmStoreError::LockPoisoned)?;
        alarms
            .get(id)
            .cloned()
            .ok_or(AlarmStoreError::NotFound(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_alarm_builder() {
        let alarm = Alarm::new(time(7, 0))
            .with_label("Work")
            .with_days([Weekday::Mon, Weekday::Tue]);

        assert_eq!(alarm.label, "Work");
        assert_eq!(alarm.days, vec![Weekday::Mon, Weekday::Tue]);
        assert!(alarm.enabled);
    }

    #[test]
    fn test_display_time_pads_zeroes() {
        let alarm = Alarm::new(time(7, 5));
        assert_eq!(alarm.display_time(), "07:05");
    }

    #[test]
    fn test_is_active_requires_days_and_enabled() {
        let no_days = Alarm::new(time(7, 0));
        assert!(!no_days.is_active());

        let disabled = Alarm::new(time(7, 0))
            .with_days([Weekday::Mon])
            .with_enabled(false);
        assert!(!disabled.is_active());

        let active = Alarm::new(time(7, 0)).with_days([Weekday::Mon]);
        assert!(active.is_active());
    }

    #[tokio::test]
    async fn test_all_alarms_sorted_by_time() {
        let store = InMemoryAlarmStore::with_alarms([
            Alarm::new(time(9, 30)).with_days([Weekday::Mon]),
            Alarm::new(time(6, 45)).with_days([Weekday::Mon]),
            Alarm::new(time(8, 0)).with_days([Weekday::Mon]),
        ]);

        let alarms = store.all_alarms().await.unwrap();
        let times: Vec<_> = alarms.iter().map(|a| a.display_time()).collect();
        assert_eq!(times, vec!["06:45", "08:00", "09:30"]);
    }

    #[tokio::test]
    async fn test_get_alarm_by_id() {
        let alarm = Alarm::new(time(7, 0)).with_label("Gym");
        let id = alarm.id;
        let store = InMemoryAlarmStore::with_alarms([alarm]);

        let fetched = store.alarm(&id).await.unwrap();
        assert_eq!(fetched.label, "Gym");
    }

    #[tokio::test]
    async fn test_get_missing_alarm_returns_not_found() {
        let store = InMemoryAlarmStore::new();
        let result = store.alarm(&AlarmId::new()).await;

        assert!(matches!(result, Err(AlarmStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let alarm = Alarm::new(time(7, 0)).with_label("Old");
        let id = alarm.id;
        let store = InMemoryAlarmStore::with_alarms([alarm.clone()]);

        store.upsert(alarm.with_label("New")).unwrap();

        let fetched = store.alarm(&id).await.unwrap();
        assert_eq!(fetched.label, "New");
        assert_eq!(store.all_alarms().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_alarm_errors() {
        let store = InMemoryAlarmStore::new();
        assert!(store.remove(&AlarmId::new()).is_err());
    }
}
