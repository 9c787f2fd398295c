//! Date/time utilities for askar.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Parse a stored timestamp string as UTC.
///
/// Accepts RFC3339, the SQLite format (`YYYY-MM-DD HH:MM:SS`) and bare dates
/// (`YYYY-MM-DD`, taken as midnight UTC). Returns `None` for anything else.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a time zone name, falling back to UTC.
pub fn parse_timezone(name: &str) -> Tz {
    name.parse().unwrap_or(Tz::UTC)
}

/// Whether both instants fall on the same calendar day in `tz`.
pub fn same_day(a: &DateTime<Utc>, b: &DateTime<Utc>, tz: Tz) -> bool {
    a.with_timezone(&tz).date_naive() == b.with_timezone(&tz).date_naive()
}

/// Whether both instants fall in the same calendar month and year in `tz`.
pub fn same_month(a: &DateTime<Utc>, b: &DateTime<Utc>, tz: Tz) -> bool {
    let (a, b) = (a.with_timezone(&tz), b.with_timezone(&tz));
    a.year() == b.year() && a.month() == b.month()
}

/// Current time as an RFC3339 string (UTC, second precision).
pub fn now_rfc3339() -> String {
    to_rfc3339_utc(&Utc::now())
}

/// Format an instant as RFC3339 (UTC, second precision).
pub fn to_rfc3339_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339.
///
/// The database stores UTC, so a 'Z' suffix is appended.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}

/// Format an instant in the SQLite datetime format.
pub fn to_sql_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
