//! Timestamp normalization for heterogeneous site exports
//!
//! The two site layouts render timestamps differently (`M/D/YYYY H:MM` in the
//! wide export, `YYYY-MM-DD HH:MM:SS` in the narrow export), and both appear
//! with and without seconds. Normalization tries each known format in order
//! and interprets the result as UTC.

use crate::constants::{CANONICAL_TIMESTAMP_FORMAT, TIMESTAMP_FORMATS};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Normalize a source timestamp string to a UTC timestamp.
///
/// Formats from [`TIMESTAMP_FORMATS`] are tried in order; the first match
/// wins. Site exports carry wall-clock time with no zone indicator, so the
/// parsed value is taken as UTC.
pub fn normalize_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::timestamp_parsing(raw, "empty timestamp"));
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }

    Err(Error::timestamp_parsing(
        raw,
        "no known timestamp format matched",
    ))
}

/// Render a normalized timestamp in the canonical report form
pub fn canonical_key(timestamp: DateTime<Utc>) -> String {
    timestamp.format(CANONICAL_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_narrow_export_format() {
        let ts = normalize_timestamp("2024-01-10 00:05:00").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 10);
        assert_eq!(ts.minute(), 5);
    }

    #[test]
    fn test_wide_export_format() {
        // Month/day/year with no seconds, as the wide site exports it
        let ts = normalize_timestamp("1/10/2024 00:00").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 10);
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_slash_date_with_seconds() {
        let ts = normalize_timestamp("2024/01/10 12:30:45").unwrap();
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.second(), 45);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert!(normalize_timestamp("  2024-01-10 00:00:00  ").is_ok());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(normalize_timestamp("not a time").is_err());
        assert!(normalize_timestamp("").is_err());
        assert!(normalize_timestamp("2024-13-40 99:99:99").is_err());
    }

    #[test]
    fn test_canonical_key_round_trip() {
        let ts = normalize_timestamp("1/10/2024 00:00").unwrap();
        assert_eq!(canonical_key(ts), "2024-01-10 00:00:00");
        // The canonical rendering parses back to the same instant
        assert_eq!(normalize_timestamp(&canonical_key(ts)).unwrap(), ts);
    }
}
