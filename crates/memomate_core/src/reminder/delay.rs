//! Due date/time parsing and reminder delay computation.
//!
//! Due values are stored as display strings: `Mon DD, YYYY` for the date
//! and `HH:MM AM/PM` for the time. Everything here is infallible towards
//! the caller; unparsable input degrades to "due now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::time::Duration;

/// `chrono` pattern for a stored due date, e.g. `Jan 05, 2025`.
pub const DUE_DATE_FORMAT: &str = "%b %d, %Y";
/// `chrono` pattern for a stored due time, e.g. `09:30 AM`.
pub const DUE_TIME_FORMAT: &str = "%I:%M %p";

const DUE_DATE_TIME_FORMAT: &str = "%b %d, %Y %I:%M %p";

/// Returns how long to wait before the reminder for `due_date due_time` fires.
///
/// The due strings are read as wall-clock time in `now`'s time zone.
/// Returns `Duration::ZERO` when the due instant is not strictly after
/// `now`, when the strings do not parse, or when the wall-clock time does
/// not exist in that zone.
pub fn compute_delay<Tz: TimeZone>(due_date: &str, due_time: &str, now: &DateTime<Tz>) -> Duration {
    let Some(due_at) = resolve_due_instant(due_date, due_time, &now.timezone()) else {
        return Duration::ZERO;
    };

    let delay_ms = due_at.timestamp_millis() - now.timestamp_millis();
    if delay_ms > 0 {
        Duration::from_millis(delay_ms.unsigned_abs())
    } else {
        Duration::ZERO
    }
}

/// Resolves the due strings into an instant in `tz`.
pub fn resolve_due_instant<Tz: TimeZone>(
    due_date: &str,
    due_time: &str,
    tz: &Tz,
) -> Option<DateTime<Tz>> {
    let raw = format!("{} {}", due_date.trim(), due_time.trim());
    let naive = NaiveDateTime::parse_from_str(&raw, DUE_DATE_TIME_FORMAT).ok()?;
    tz.from_local_datetime(&naive).earliest()
}

/// Parses a stored due date into a calendar date.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DUE_DATE_FORMAT).ok()
}

/// Formats a calendar date the way due and created dates are stored.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

/// Formats a wall-clock time on the 12-hour clock (`12` for noon/midnight).
pub fn format_due_time(time: NaiveTime) -> String {
    time.format(DUE_TIME_FORMAT).to_string()
}
