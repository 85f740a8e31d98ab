//! Calendar: the resolved set of instants a schedule fires at, and next-invocation search.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike};

use crate::error::SchedulerError;

/// How day-of-month and day-of-week constraints combine when both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayMatch {
    /// Both must match (recurrence rules).
    All,
    /// Either may match (cron, when both fields are restricted).
    Any,
}

/// Longest search window for the next invocation (covers leap-day rules with weekday constraints).
const MAX_SEARCH_DAYS: u32 = 366 * 28;

/// Allowed values per field. `None` on the day/month/year fields means "any".
/// Months are 1-12, weekdays 0-6 with Sunday = 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    seconds: Vec<u32>,
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Option<Vec<u32>>,
    months: Option<Vec<u32>>,
    days_of_week: Option<Vec<u32>>,
    years: Option<Vec<i32>>,
    day_match: DayMatch,
}

/// Sorts, dedups and range-checks one field.
pub(crate) fn normalize_field(
    name: &str,
    mut values: Vec<u32>,
    min: u32,
    max: u32,
) -> Result<Vec<u32>, SchedulerError> {
    if values.is_empty() {
        return Err(SchedulerError::InvalidRule(format!("{} has no values", name)));
    }
    if let Some(bad) = values.iter().find(|v| **v < min || **v > max) {
        return Err(SchedulerError::InvalidRule(format!(
            "{} value {} out of range {}-{}",
            name, bad, min, max
        )));
    }
    values.sort_unstable();
    values.dedup();
    Ok(values)
}

impl Calendar {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        seconds: Vec<u32>,
        minutes: Vec<u32>,
        hours: Vec<u32>,
        days_of_month: Option<Vec<u32>>,
        months: Option<Vec<u32>>,
        days_of_week: Option<Vec<u32>>,
        years: Option<Vec<i32>>,
        day_match: DayMatch,
    ) -> Result<Self, SchedulerError> {
        let seconds = normalize_field("second", seconds, 0, 59)?;
        let minutes = normalize_field("minute", minutes, 0, 59)?;
        let hours = normalize_field("hour", hours, 0, 23)?;
        let days_of_month = days_of_month
            .map(|v| normalize_field("day of month", v, 1, 31))
            .transpose()?;
        let months = months.map(|v| normalize_field("month", v, 1, 12)).transpose()?;
        let days_of_week = days_of_week
            .map(|v| normalize_field("day of week", v, 0, 6))
            .transpose()?;
        let years = match years {
            Some(mut y) if !y.is_empty() => {
                y.sort_unstable();
                y.dedup();
                Some(y)
            }
            Some(_) => return Err(SchedulerError::InvalidRule("year has no values".to_string())),
            None => None,
        };
        Ok(Self {
            seconds,
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            years,
            day_match,
        })
    }

    /// Every day at `hour:00:00`.
    pub fn daily_at(hour: u32) -> Result<Self, SchedulerError> {
        Self::new(vec![0], vec![0], vec![hour], None, None, None, None, DayMatch::All)
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        if let Some(years) = &self.years {
            if !years.contains(&date.year()) {
                return false;
            }
        }
        if let Some(months) = &self.months {
            if !months.contains(&date.month()) {
                return false;
            }
        }
        let dom = self
            .days_of_month
            .as_ref()
            .map(|d| d.contains(&date.day()));
        let dow = self
            .days_of_week
            .as_ref()
            .map(|d| d.contains(&date.weekday().num_days_from_sunday()));
        match (dom, dow, self.day_match) {
            (Some(a), Some(b), DayMatch::Any) => a || b,
            (Some(a), Some(b), DayMatch::All) => a && b,
            (Some(a), None, _) | (None, Some(a), _) => a,
            (None, None, _) => true,
        }
    }

    /// First instant strictly after `after` (whole seconds) that matches every field.
    /// Local times skipped by a DST gap are not candidates; ambiguous ones resolve to the earlier instant.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let local = after.naive_local();
        let base = local.with_nanosecond(0)? + Duration::seconds(1);
        let first_day = base.date();
        let mut date = first_day;

        for _ in 0..MAX_SEARCH_DAYS {
            if self.day_matches(date) {
                for &h in &self.hours {
                    if date == first_day && h < base.hour() {
                        continue;
                    }
                    for &m in &self.minutes {
                        for &s in &self.seconds {
                            let Some(candidate) = date.and_hms_opt(h, m, s) else {
                                continue;
                            };
                            if candidate < base {
                                continue;
                            }
                            if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
                                return Some(dt);
                            }
                        }
                    }
                }
            }
            date = date.succ_opt()?;
        }
        None
    }
}
