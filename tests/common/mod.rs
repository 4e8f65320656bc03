//! Common test utilities shared across integration tests.

use chrono::{NaiveDate, NaiveDateTime};
use reveil::{SharedDir, WakeKind};
use tempfile::TempDir;

/// A fixed "now" for deterministic reconciliation: 2026-02-12 06:00:00,
/// a Thursday morning.
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 2, 12)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap()
}

/// Create an empty shared directory backed by a tempdir.
///
/// The TempDir must be kept alive for the duration of the test.
pub fn shared_dir() -> (TempDir, SharedDir) {
    let temp = TempDir::new().unwrap();
    let dir = SharedDir::new(temp.path());
    (temp, dir)
}

/// Write a raw schedule document, exactly as the application would.
pub fn write_schedule_json(dir: &SharedDir, json: &str) {
    std::fs::write(dir.schedule_path(), json).unwrap();
}

/// The outstanding wake recorded in the state document, if any.
pub fn outstanding(dir: &SharedDir) -> Option<(WakeKind, String)> {
    let state = dir.load_state();
    state
        .outstanding()
        .map(|(kind, wake)| (kind, wake.to_string()))
}
