//! Calendar-date helpers shared by the cycle engine and the CLI.
//!
//! The whole system operates on local calendar days, never instants: the
//! only wire format for dates is `YYYY-MM-DD`, which is exactly chrono's
//! `NaiveDate` ISO form.

use crate::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// Parse a `YYYY-MM-DD` calendar-date string
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::Date(s.to_string()))
}

/// Format a date as a zero-padded `YYYY-MM-DD` string
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Number of days in the given month (1-indexed month)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

/// Whether `date` is the last calendar day of its month
pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.day() == days_in_month(date.year(), date.month())
}

/// The Sunday on or before `date` (weeks run Sunday through Saturday)
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_and_format_roundtrip() {
        let date = d("2025-03-09");
        assert_eq!(format_date(date), "2025-03-09");
    }

    #[test]
    fn test_parse_rejects_malformed_strings() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_format_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(date), "2025-01-05");
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29); // leap year
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2000, 2), 29); // divisible by 400
        assert_eq!(days_in_month(1900, 2), 28); // divisible by 100 only
    }

    #[test]
    fn test_is_last_day_of_month() {
        assert!(is_last_day_of_month(d("2025-01-31")));
        assert!(!is_last_day_of_month(d("2025-01-30")));
        assert!(is_last_day_of_month(d("2025-02-28")));
        assert!(is_last_day_of_month(d("2024-02-29")));
        assert!(!is_last_day_of_month(d("2024-02-28")));
    }

    #[test]
    fn test_start_of_week() {
        // 2025-01-01 is a Wednesday; the week began Sunday 2024-12-29
        assert_eq!(start_of_week(d("2025-01-01")), d("2024-12-29"));
        // A Sunday is its own week start
        assert_eq!(start_of_week(d("2025-01-05")), d("2025-01-05"));
        // Saturday still belongs to the week that began six days earlier
        assert_eq!(start_of_week(d("2025-01-11")), d("2025-01-05"));
    }
}
