//! Core identifier types for the wake scheduler.
//!
//! These types provide type-safe identifiers for alarms and OS wake-request
//! categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an alarm record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmId(Uuid);

/// Category of an OS wake request.
///
/// There is exactly one category in use (`wakeorpoweron`), but the type is
/// kept generic so persisted state can round-trip categories introduced by
/// other facility versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WakeKind(String);

impl AlarmId {
    /// Generate a new random AlarmId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an AlarmId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AlarmId {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeKind {
    /// The wake request category used for alarm wakes: wake the machine, or
    /// power it on if it is shut down.
    pub const WAKE_OR_POWER_ON: &'static str = "wakeorpoweron";

    /// Create a WakeKind from a string.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The category used for every wake this scheduler issues.
    pub fn wake_or_power_on() -> Self {
        Self::new(Self::WAKE_OR_POWER_ON)
    }

    /// Get the underlying string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WakeKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WakeKind {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alarm_id_is_unique() {
        let id1 = AlarmId::new();
        let id2 = AlarmId::new();

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_alarm_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = AlarmId::from_uuid(uuid);

        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_wake_kind_default_category() {
        let kind = WakeKind::wake_or_power_on();
        assert_eq!(kind.as_str(), "wakeorpoweron");
    }

    #[test]
    fn test_wake_kind_from_str() {
        let kind: WakeKind = "wakeorpoweron".into();
        assert_eq!(kind, WakeKind::wake_or_power_on());
    }

    #[test]
    fn test_wake_kind_display() {
        let kind = WakeKind::new("sleep");
        assert_eq!(format!("{}", kind), "sleep");
    }

    #[test]
    fn test_ids_are_hashable() {
        use std::collections::HashSet;

        let mut kinds: HashSet<WakeKind> = HashSet::new();
        kinds.insert(WakeKind::wake_or_power_on());
        kinds.insert(WakeKind::new("poweron"));
        kinds.insert(WakeKind::wake_or_power_on()); // duplicate

        assert_eq!(kinds.len(), 2);
    }
}
