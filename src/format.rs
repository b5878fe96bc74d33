// Text formatting for durations and timestamps.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt;

const SECOND_MS: u64 = 1_000;
const MINUTE_SECS: u64 = 60;
const HOUR_SECS: u64 = 3_600;
const DAY_SECS: u64 = 86_400;

/// Compact human duration: `0s`, `42s`, `5m`, `5m3s`, `2h7m (02:07:31)`,
/// `1d3h (27:00:00)`. Everything is floored.
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / SECOND_MS;
    if total_secs < MINUTE_SECS {
        return format!("{}s", total_secs);
    }
    if total_secs < HOUR_SECS {
        let m = total_secs / MINUTE_SECS;
        let s = total_secs % MINUTE_SECS;
        return if s > 0 {
            format!("{}m{}s", m, s)
        } else {
            format!("{}m", m)
        };
    }

    // The clock part keeps counting hours past 24.
    let hours = total_secs / HOUR_SECS;
    let m = (total_secs % HOUR_SECS) / MINUTE_SECS;
    let s = total_secs % MINUTE_SECS;
    let clock = format!("{:02}:{:02}:{:02}", hours, m, s);

    let days = total_secs / DAY_SECS;
    let mut human = String::new();
    if days > 0 {
        human.push_str(&format!("{}d", days));
        let h = hours % 24;
        if h > 0 {
            human.push_str(&format!("{}h", h));
        }
    } else {
        human.push_str(&format!("{}h", hours));
    }
    if m > 0 {
        human.push_str(&format!("{}m", m));
    }
    format!("{} ({})", human, clock)
}

/// `Sun, Aug 31, 2025 08:30:28 (08:30:28 AM)` in the given zone.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format("%a, %b %-d, %Y %H:%M:%S (%I:%M:%S %p)").to_string()
}

pub fn format_local(at: DateTime<Utc>) -> String {
    format_timestamp(&at.with_timezone(&Local))
}

pub fn current_timestamp() -> String {
    format_timestamp(&Local::now())
}
