//! Display formatting for dates and times.

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

/// Shown when a trip has no date yet.
pub const NO_DATE: &str = "No date";

/// Shown when a stored date cannot be parsed or formatted.
pub const INVALID_DATE: &str = "Invalid date";

/// Date-time layouts accepted besides plain dates and RFC 3339.
const DATE_TIME_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a stored or typed date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and local date-times
/// (`YYYY-MM-DDTHH:MM[:SS]`). Time and offset are discarded.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.date_naive());
    }
    DATE_TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .map(|date_time| date_time.date())
}

/// Format a date for display using a `strftime` pattern.
///
/// Missing or blank input gives [`NO_DATE`]; anything unparsable, or a
/// pattern chrono cannot render, gives [`INVALID_DATE`].
#[must_use]
pub fn format_date(value: Option<&str>, pattern: &str) -> String {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return NO_DATE.to_string();
    };
    let Some(date) = parse_date(value) else {
        return INVALID_DATE.to_string();
    };

    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return INVALID_DATE.to_string();
    }
    out
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{1,2})(?::\d{1,2})?$").expect("time pattern is valid")
    })
}

/// Convert `HH:MM` (24-hour) to `H:MM AM/PM`.
///
/// Seconds, if present, are dropped. Malformed input or an hour outside
/// 0–23 (minute outside 0–59) gives an empty string.
#[must_use]
pub fn format_24_hour_to_12_hour(value: &str) -> String {
    let Some(captures) = time_pattern().captures(value.trim()) else {
        return String::new();
    };
    let (Ok(hour), Ok(minute)) = (captures[1].parse::<u32>(), captures[2].parse::<u32>()) else {
        return String::new();
    };
    if hour > 23 || minute > 59 {
        return String::new();
    }

    let period = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minute:02} {period}")
}

/// Normalize a date to `YYYY-MM-DD` for form defaults.
///
/// Blank input gives an empty string. Unparsable input also gives an empty
/// string and is logged as a warning.
#[must_use]
pub fn format_to_yyyy_mm_dd(value: &str) -> String {
    if value.trim().is_empty() {
        return String::new();
    }
    match parse_date(value) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => {
            warn!("Cannot normalize invalid date '{}'", value);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = "%B %-d, %Y";

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-06-01"), PATTERN), "June 1, 2024");
        assert_eq!(
            format_date(Some("2024-06-01T23:10:00Z"), PATTERN),
            "June 1, 2024"
        );
    }

    #[test]
    fn test_format_date_fallbacks() {
        assert_eq!(format_date(None, PATTERN), NO_DATE);
        assert_eq!(format_date(Some("  "), PATTERN), NO_DATE);
        assert_eq!(format_date(Some("yesterday"), PATTERN), INVALID_DATE);
        assert_eq!(format_date(Some("2024-02-30"), PATTERN), INVALID_DATE);
    }

    #[test]
    fn test_format_date_bad_pattern_does_not_panic() {
        assert_eq!(format_date(Some("2024-06-01"), "%Q"), INVALID_DATE);
    }

    #[test]
    fn test_parse_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_date("2024-06-01"), expected);
        assert_eq!(parse_date("2024-06-01T08:30"), expected);
        assert_eq!(parse_date("2024-06-01T08:30:15"), expected);
        assert_eq!(parse_date("2024-06-01T08:30:15+02:00"), expected);
        assert_eq!(parse_date("06/01/2024"), None);
    }

    #[test]
    fn test_12_hour_conversion() {
        assert_eq!(format_24_hour_to_12_hour("00:00"), "12:00 AM");
        assert_eq!(format_24_hour_to_12_hour("13:05"), "1:05 PM");
        assert_eq!(format_24_hour_to_12_hour("12:30"), "12:30 PM");
        assert_eq!(format_24_hour_to_12_hour("11:59"), "11:59 AM");
        assert_eq!(format_24_hour_to_12_hour("7:5"), "7:05 AM");
        assert_eq!(format_24_hour_to_12_hour("23:15:42"), "11:15 PM");
    }

    #[test]
    fn test_12_hour_conversion_malformed() {
        assert_eq!(format_24_hour_to_12_hour("bad"), "");
        assert_eq!(format_24_hour_to_12_hour("1305"), "");
        assert_eq!(format_24_hour_to_12_hour("ab:cd"), "");
        assert_eq!(format_24_hour_to_12_hour("24:00"), "");
        assert_eq!(format_24_hour_to_12_hour("10:60"), "");
        assert_eq!(format_24_hour_to_12_hour(""), "");
    }

    #[test]
    fn test_format_to_yyyy_mm_dd() {
        assert_eq!(format_to_yyyy_mm_dd("2024-06-01T08:30:00Z"), "2024-06-01");
        assert_eq!(format_to_yyyy_mm_dd("2024-06-01"), "2024-06-01");
        assert_eq!(format_to_yyyy_mm_dd("not a date"), "");
        assert_eq!(format_to_yyyy_mm_dd(""), "");
    }

    #[test]
    fn test_format_to_yyyy_mm_dd_idempotent() {
        for input in ["2024-06-01", "2023-12-31T23:59:59Z", "2020-02-29T06:00"] {
            let once = format_to_yyyy_mm_dd(input);
            assert_eq!(format_to_yyyy_mm_dd(&once), once);
        }
    }
}
