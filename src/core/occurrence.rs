//! Next-occurrence calculation for repeating alarms.
//!
//! Given the alarm list and the current moment, resolve the single next
//! concrete local datetime at which any alarm fires. This is plain calendar
//! arithmetic over repeat weekdays: scan today plus the following seven days;
//! an occurrence today only counts if its time of day is still strictly in
//! the future at minute granularity.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Timelike};

use super::alarm::Alarm;
use super::types::AlarmId;

/// A resolved upcoming alarm firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// The alarm that fires.
    pub alarm_id: AlarmId,
    /// Concrete local datetime of the firing.
    pub when: NaiveDateTime,
    /// The alarm's `HH:MM` display time.
    pub alarm_time: String,
    /// The alarm's label.
    pub label: String,
}

/// Find the next occurrence across all alarms, or `None` if no active alarm
/// will fire within the coming week.
pub fn next_occurrence(alarms: &[Alarm], now: NaiveDateTime) -> Option<Occurrence> {
    alarms
        .iter()
        .filter(|a| a.is_active())
        .filter_map(|a| alarm_occurrence(a, now))
        .min_by_key(|o| o.when)
}

/// Resolve the next firing of a single alarm, scanning today plus seven days.
fn alarm_occurrence(alarm: &Alarm, now: NaiveDateTime) -> Option<Occurrence> {
    // Minute granularity: an alarm at the current minute already rang.
    let now_minute = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)?;

    for offset in 0..=7u64 {
        let date = now.date().checked_add_days(Days::new(offset))?;
        if !alarm.days.contains(&date.weekday()) {
            continue;
        }
        if offset == 0 && alarm.time <= now_minute {
            continue;
        }
        return Some(Occurrence {
            alarm_id: alarm.id,
            when: date.and_time(alarm.time),
            alarm_time: alarm.display_time(),
            label: alarm.label.clone(),
        });
    }
    None
}
