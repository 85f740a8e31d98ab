//! Cron expressions: 5 fields (`min hour dom month dow`) or 6 with leading seconds.
//!
//! Each field accepts `*`, `?`, numbers, `a-b` ranges, `/step` and comma lists. Months and weekdays also
//! accept three-letter names. Weekday 7 is Sunday. When both day-of-month and day-of-week are restricted,
//! either may match.

use std::fmt;
use std::str::FromStr;

use crate::calendar::{Calendar, DayMatch};
use crate::error::SchedulerError;

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// A parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    source: String,
    calendar: Calendar,
}

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
    /// Value of the first entry in `names`.
    names_base: u32,
}

const SECOND: FieldSpec = FieldSpec { name: "second", min: 0, max: 59, names: &[], names_base: 0 };
const MINUTE: FieldSpec = FieldSpec { name: "minute", min: 0, max: 59, names: &[], names_base: 0 };
const HOUR: FieldSpec = FieldSpec { name: "hour", min: 0, max: 23, names: &[], names_base: 0 };
const DAY_OF_MONTH: FieldSpec =
    FieldSpec { name: "day of month", min: 1, max: 31, names: &[], names_base: 0 };
const MONTH: FieldSpec =
    FieldSpec { name: "month", min: 1, max: 12, names: &MONTH_NAMES, names_base: 1 };
const DAY_OF_WEEK: FieldSpec =
    FieldSpec { name: "day of week", min: 0, max: 7, names: &WEEKDAY_NAMES, names_base: 0 };

impl CronExpr {
    /// Parses `expr`. Errors name the offending field.
    pub fn parse(expr: &str) -> Result<Self, SchedulerError> {
        let invalid = |reason: String| SchedulerError::InvalidCron {
            expr: expr.to_string(),
            reason,
        };

        let fields: Vec<&str> = expr.split_whitespace().collect();
        let (second, rest) = match fields.len() {
            5 => (None, &fields[..]),
            6 => (Some(fields[0]), &fields[1..]),
            n => return Err(invalid(format!("expected 5 or 6 fields, got {}", n))),
        };

        let seconds = match second {
            Some(f) => parse_field(f, &SECOND).map_err(&invalid)?.unwrap_or_else(|| all(&SECOND)),
            None => vec![0],
        };
        let minutes = parse_field(rest[0], &MINUTE).map_err(&invalid)?.unwrap_or_else(|| all(&MINUTE));
        let hours = parse_field(rest[1], &HOUR).map_err(&invalid)?.unwrap_or_else(|| all(&HOUR));
        let days_of_month = parse_field(rest[2], &DAY_OF_MONTH).map_err(&invalid)?;
        let months = parse_field(rest[3], &MONTH).map_err(&invalid)?;
        let days_of_week = parse_field(rest[4], &DAY_OF_WEEK)
            .map_err(&invalid)?
            .map(|days| days.into_iter().map(|d| d % 7).collect::<Vec<u32>>());

        let day_match = if days_of_month.is_some() && days_of_week.is_some() {
            DayMatch::Any
        } else {
            DayMatch::All
        };

        let calendar = Calendar::new(
            seconds,
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            None,
            day_match,
        )
        .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            source: expr.trim().to_string(),
            calendar,
        })
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for CronExpr {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CronExpr::parse(s)
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn all(spec: &FieldSpec) -> Vec<u32> {
    (spec.min..=spec.max).collect()
}

/// `Ok(None)` for a wildcard field.
fn parse_field(field: &str, spec: &FieldSpec) -> Result<Option<Vec<u32>>, String> {
    if field == "*" || field == "?" {
        return Ok(None);
    }
    let mut values = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| format!("{}: bad step '{}'", spec.name, step))?;
                if step == 0 {
                    return Err(format!("{}: step must be positive", spec.name));
                }
                (range, step)
            }
            None => (part, 1),
        };

        let (start, end) = if range == "*" || range == "?" {
            (spec.min, spec.max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_value(a, spec)?, parse_value(b, spec)?)
        } else {
            let start = parse_value(range, spec)?;
            // `a/n` runs from a to the end of the field.
            let end = if part.contains('/') { spec.max } else { start };
            (start, end)
        };

        if start > end {
            return Err(format!("{}: range {}-{} is reversed", spec.name, start, end));
        }
        values.extend((start..=end).step_by(step as usize));
    }
    Ok(Some(values))
}

fn parse_value(raw: &str, spec: &FieldSpec) -> Result<u32, String> {
    let lower = raw.to_ascii_lowercase();
    let value = match spec.names.iter().position(|n| *n == lower) {
        Some(idx) => idx as u32 + spec.names_base,
        None => raw
            .parse()
            .map_err(|_| format!("{}: bad value '{}'", spec.name, raw))?,
    };
    if value < spec.min || value > spec.max {
        return Err(format!(
            "{}: value {} out of range {}-{}",
            spec.name, value, spec.min, spec.max
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_forms() {
        assert_eq!(parse_field("*", &MINUTE).unwrap(), None);
        assert_eq!(parse_field("5", &MINUTE).unwrap(), Some(vec![5]));
        assert_eq!(parse_field("1-3", &MINUTE).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(parse_field("*/20", &MINUTE).unwrap(), Some(vec![0, 20, 40]));
        assert_eq!(parse_field("50/5", &MINUTE).unwrap(), Some(vec![50, 55]));
        assert_eq!(parse_field("1,10-12/2", &MINUTE).unwrap(), Some(vec![1, 10, 12]));
        assert_eq!(parse_field("mon-wed", &DAY_OF_WEEK).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(parse_field("DEC", &MONTH).unwrap(), Some(vec![12]));
    }

    #[test]
    fn test_parse_field_errors() {
        assert!(parse_field("60", &MINUTE).is_err());
        assert!(parse_field("5-1", &MINUTE).is_err());
        assert!(parse_field("*/0", &MINUTE).is_err());
        assert!(parse_field("abc", &HOUR).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = CronExpr::parse("* * *").unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidCron { .. }));
    }

    #[test]
    fn test_sunday_as_seven() {
        let a = CronExpr::parse("0 9 * * 7").unwrap();
        let b = CronExpr::parse("0 9 * * 0").unwrap();
        assert_eq!(a.calendar(), b.calendar());
    }
}
