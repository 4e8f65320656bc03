//! Local-naive datetime parsing and facility formatting.
//!
//! Wake times cross two serialization boundaries: the application writes
//! ISO-ish local timestamps into the schedule document, and `pmset` expects
//! its own `MM/DD/YYYY HH:MM:SS` form. Neither carries a UTC offset; all
//! arithmetic happens in the machine's local time.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Input formats accepted for the schedule document's `nextWake` field.
///
/// Ordered so the most specific variants are tried first.
const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Format `pmset schedule` expects for its datetime argument.
const FACILITY_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Errors that can occur when parsing wake datetimes.
#[derive(Debug, Error)]
pub enum DatetimeError {
    /// The string matched none of the accepted formats.
    #[error("invalid datetime format: {0}")]
    InvalidFormat(String),
}

/// Parse a local-naive wake datetime from the schedule document.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DDTHH:MM`, and the
/// space-separated variants of both.
pub fn parse_local(input: &str) -> Result<NaiveDateTime, DatetimeError> {
    let trimmed = input.trim();
    for format in ACCEPTED_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    Err(DatetimeError::InvalidFormat(input.to_string()))
}

/// Format a datetime the way the wake facility expects it.
pub fn format_for_facility(datetime: NaiveDateTime) -> String {
    datetime.format(FACILITY_FORMAT).to_string()
}

/// Parse a facility-formatted datetime back into a local-naive value.
///
/// Used by diagnostics to interpret a persisted `lastScheduledWake`.
pub fn parse_facility(input: &str) -> Result<NaiveDateTime, DatetimeError> {
    NaiveDateTime::parse_from_str(input.trim(), FACILITY_FORMAT)
        .map_err(|_| DatetimeError::InvalidFormat(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_iso_with_seconds() {
        let parsed = parse_local("2026-02-12T07:00:00").unwrap();
        assert_eq!(parsed, dt(2026, 2, 12, 7, 0, 0));
    }

    #[test]
    fn test_parse_iso_without_seconds() {
        let parsed = parse_local("2026-02-12T07:00").unwrap();
        assert_eq!(parsed, dt(2026, 2, 12, 7, 0, 0));
    }

    #[test]
    fn test_parse_space_separated() {
        let parsed = parse_local("2026-02-12 07:00:00").unwrap();
        assert_eq!(parsed, dt(2026, 2, 12, 7, 0, 0));

        let parsed = parse_local("2026-02-12 07:00").unwrap();
        assert_eq!(parsed, dt(2026, 2, 12, 7, 0, 0));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let parsed = parse_local("  2026-02-12T07:00:00\n").unwrap();
        assert_eq!(parsed, dt(2026, 2, 12, 7, 0, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result = parse_local("not a datetime");
        assert!(matches!(result, Err(DatetimeError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_rejects_date_only() {
        assert!(parse_local("2026-02-12").is_err());
    }

    #[test]
    fn test_facility_format() {
        let formatted = format_for_facility(dt(2026, 2, 12, 6, 59, 0));
        assert_eq!(formatted, "02/12/2026 06:59:00");
    }

    #[test]
    fn test_facility_format_round_trip() {
        let original = dt(2026, 12, 31, 23, 59, 59);
        let parsed = parse_facility(&format_for_facility(original)).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_facility_rejects_iso() {
        assert!(parse_facility("2026-02-12T07:00:00").is_err());
    }
}
