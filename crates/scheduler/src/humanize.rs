//! Relative time phrases ("in 3 hours", "a minute ago") for job log lines.

use chrono::{DateTime, TimeZone};

/// Describes `target` relative to `now`, rounding the way humans read schedules.
pub fn from_now<Tz: TimeZone, Tz2: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz2>) -> String {
    let delta = target.timestamp() - now.timestamp();
    let phrase = magnitude(delta.unsigned_abs());
    if delta >= 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn magnitude(secs: u64) -> String {
    let rounded = |unit: u64| ((secs as f64) / (unit as f64)).round() as u64;
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    if secs < 45 {
        "a few seconds".to_string()
    } else if secs < 90 {
        "a minute".to_string()
    } else if secs < 45 * MINUTE {
        format!("{} minutes", rounded(MINUTE))
    } else if secs < 90 * MINUTE {
        "an hour".to_string()
    } else if secs < 22 * HOUR {
        format!("{} hours", rounded(HOUR))
    } else if secs < 36 * HOUR {
        "a day".to_string()
    } else if secs < 26 * DAY {
        format!("{} days", rounded(DAY))
    } else if secs < 45 * DAY {
        "a month".to_string()
    } else if secs < 320 * DAY {
        format!("{} months", rounded(30 * DAY))
    } else if secs < 548 * DAY {
        "a year".to_string()
    } else {
        format!("{} years", rounded(365 * DAY))
    }
}
