//! Date/time utilities for agora.
//!
//! Timestamps are stored as fixed-width RFC3339 UTC strings with millisecond
//! precision, so text comparison in SQL matches chronological order.

use chrono::{DateTime, DurationRound, FixedOffset, NaiveDateTime, SecondsFormat, TimeDelta, Utc};

/// Format a timestamp for storage.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use agora::datetime::to_db_timestamp;
///
/// let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
/// assert_eq!(to_db_timestamp(&dt), "2024-01-15T10:30:00.000Z");
/// ```
pub fn to_db_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Drop precision below what storage keeps (milliseconds).
pub fn truncate(dt: &DateTime<Utc>) -> DateTime<Utc> {
    dt.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(*dt)
}

/// Current time truncated to storage precision.
pub fn now() -> DateTime<Utc> {
    truncate(&Utc::now())
}

/// Parse a timestamp given by a client or read from the database.
///
/// Accepts RFC3339 with any offset, or SQLite format (YYYY-MM-DD HH:MM:SS)
/// taken as UTC. Returns `None` if neither matches.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
