use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Current local wall-clock time, e.g. `2024-01-01 12:00:00 +01:00`.
pub fn current_time() -> String {
    format_time(&Local::now())
}

/// Formats `time` as `YYYY-MM-DD HH:MM:SS` followed by its zone designator.
pub fn format_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TIME_FORMAT).to_string()
}
