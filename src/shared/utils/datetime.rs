use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::domain::entities::SlotTime;
use crate::domain::errors::{DomainError, DomainResult};

/// Storage and entry format of a calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage and entry format of a time of day (24-hour clock).
pub const TIME_FORMAT: &str = "%H:%M";
/// Returned by [`format`] instead of failing.
pub const INVALID_DATETIME: &str = "invalid date/time";

const MIN_YEAR: i32 = 2000;

pub const ENTRY_HINT: &str = "Use the format YYYY-MM-DD HH:MM, e.g. 2025-03-07 14:00";

/// Strict check of a `(date, time)` pair typed by a human.
pub fn validate(date: &str, time: &str) -> DomainResult<SlotTime> {
    let invalid = || DomainError::Validation(format!("Invalid date or time. {}", ENTRY_HINT));

    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| invalid())?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).map_err(|_| invalid())?;

    if date.year() < MIN_YEAR {
        return Err(DomainError::Validation(format!(
            "The year must be {} or later. {}",
            MIN_YEAR, ENTRY_HINT
        )));
    }

    Ok(SlotTime::new(date, time))
}

/// Parses a single `YYYY-MM-DD HH:MM` line.
pub fn parse_entry(input: &str) -> DomainResult<SlotTime> {
    let mut parts = input.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(date), Some(time), None) => validate(date, time),
        _ => Err(DomainError::Validation(format!(
            "Invalid date or time. {}",
            ENTRY_HINT
        ))),
    }
}

/// Display form `DD-MM-YYYY HH:MM`. Never fails: bad input yields [`INVALID_DATETIME`].
pub fn format(date: &str, time: &str) -> String {
    match lenient_parts(date, time) {
        Some((year, month, day, hours, minutes)) => {
            format!("{:02}-{:02}-{} {:02}:{:02}", day, month, year, hours, minutes)
        }
        None => {
            tracing::warn!(date = %date, time = %time, "Cannot format date/time");
            INVALID_DATETIME.to_string()
        }
    }
}

pub fn format_slot(at: &SlotTime) -> String {
    format(&at.date_key(), &at.time_key())
}

/// Range checks only; display must not reject what storage already holds.
fn lenient_parts(date: &str, time: &str) -> Option<(i32, u32, u32, u32, u32)> {
    let date = date.trim();
    let time = time.trim();
    if date.is_empty() || time.is_empty() {
        return None;
    }

    let mut ymd = date.split('-').map(|p| p.trim().parse::<u32>().ok());
    let year = ymd.next()??;
    let month = ymd.next()??;
    let day = ymd.next()??;
    if (year as i32) < MIN_YEAR || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let mut hm = time.split(':').map(|p| p.trim().parse::<u32>().ok());
    let hours = hm.next()??;
    let minutes = hm.next()??;
    if hours > 23 || minutes > 59 {
        return None;
    }

    Some((year as i32, month, day, hours, minutes))
}

/// Fixed-width RFC 3339 so stored instants sort lexicographically.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fractional hours from `now` until the slot starts; negative once it has begun.
pub fn hours_until(at: &SlotTime, now: NaiveDateTime) -> f64 {
    (at.to_local() - now).num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_day_and_month() {
        assert_eq!(format("2025-03-07", "09:05"), "07-03-2025 09:05");
    }

    #[test]
    fn test_format_returns_sentinel_on_bad_input() {
        assert_eq!(format("", "09:05"), INVALID_DATETIME);
        assert_eq!(format("2025-03-07", ""), INVALID_DATETIME);
        assert_eq!(format("abc", "09:05"), INVALID_DATETIME);
        assert_eq!(format("1999-03-07", "09:05"), INVALID_DATETIME);
        assert_eq!(format("2025-03-07", "24:00"), INVALID_DATETIME);
    }

    #[test]
    fn test_validate_rejects_impossible_month() {
        let err = validate("2025-13-01", "09:00").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_impossible_day_and_time() {
        assert!(validate("2025-02-30", "09:00").is_err());
        assert!(validate("2025-02-10", "25:00").is_err());
        assert!(validate("1999-02-10", "10:00").is_err());
    }

    #[test]
    fn test_validate_accepts_real_values() {
        let at = validate("2024-02-29", "18:30").unwrap();
        assert_eq!(at.date_key(), "2024-02-29");
        assert_eq!(at.time_key(), "18:30");
    }

    #[test]
    fn test_parse_entry_requires_two_parts() {
        assert!(parse_entry("2025-03-07 14:00").is_ok());
        assert!(parse_entry("  2025-03-07   14:00 ").is_ok());
        assert!(parse_entry("2025-03-07").is_err());
        assert!(parse_entry("2025-03-07 14:00 extra").is_err());
    }

    #[test]
    fn test_format_slot_matches_format() {
        let at = validate("2025-03-07", "09:05").unwrap();
        assert_eq!(format_slot(&at), format("2025-03-07", "09:05"));
        assert_eq!(at.to_string(), "07-03-2025 09:05");
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let a = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc();
        assert_eq!(timestamp(a), "2025-03-07T09:00:00.000Z");
        let b = a + chrono::Duration::milliseconds(1500);
        assert!(timestamp(a) < timestamp(b));
    }

    #[test]
    fn test_hours_until() {
        let at = validate("2025-03-07", "12:00").unwrap();
        let now = validate("2025-03-07", "10:30").unwrap().to_local();
        assert!((hours_until(&at, now) - 1.5).abs() < f64::EPSILON);
    }
}
