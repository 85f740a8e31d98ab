//! Schedule values as stored in blueprints and produced by modules.
//!
//! JSON forms: a number is an hour of the day, a string is a cron expression, an object is a
//! [`RecurrenceRule`] (`{"hour": 9, "minute": 30, "dayOfWeek": [1, 5]}`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calendar::{Calendar, DayMatch};
use crate::cron::CronExpr;
use crate::error::SchedulerError;

/// One recurrence-rule field: a value, a list, or an inclusive range with optional step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleField {
    One(i64),
    Many(Vec<i64>),
    Range {
        start: i64,
        end: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<i64>,
    },
}

impl From<i64> for RuleField {
    fn from(v: i64) -> Self {
        RuleField::One(v)
    }
}

impl RuleField {
    fn values(&self, name: &str) -> Result<Vec<i64>, SchedulerError> {
        match self {
            RuleField::One(v) => Ok(vec![*v]),
            RuleField::Many(vs) => Ok(vs.clone()),
            RuleField::Range { start, end, step } => {
                let step = step.unwrap_or(1);
                if step <= 0 {
                    return Err(SchedulerError::InvalidRule(format!(
                        "{} range step must be positive",
                        name
                    )));
                }
                if start > end {
                    return Err(SchedulerError::InvalidRule(format!(
                        "{} range {}-{} is reversed",
                        name, start, end
                    )));
                }
                Ok((*start..=*end).step_by(step as usize).collect())
            }
        }
    }

    /// Values shifted by `offset` and converted to calendar units; negatives are rejected.
    fn to_u32(&self, name: &str, offset: i64) -> Result<Vec<u32>, SchedulerError> {
        self.values(name)?
            .into_iter()
            .map(|v| {
                u32::try_from(v + offset).map_err(|_| {
                    SchedulerError::InvalidRule(format!("{} value {} out of range", name, v))
                })
            })
            .collect()
    }
}

/// Object-form rule. Unset fields match anything, except `second` which defaults to 0.
///
/// `month` is zero-based (0 = January) and `day_of_week` uses 0 = Sunday, matching the stored
/// blueprint format; `date` is the day of the month (1-31).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<RuleField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<RuleField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<RuleField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<RuleField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<RuleField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<RuleField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<RuleField>,
}

impl RecurrenceRule {
    /// Every day at `hour:00:00`.
    pub fn daily_at(hour: i64) -> Self {
        Self {
            second: Some(RuleField::One(0)),
            minute: Some(RuleField::One(0)),
            hour: Some(RuleField::One(hour)),
            ..Self::default()
        }
    }

    pub fn calendar(&self) -> Result<Calendar, SchedulerError> {
        let seconds = match &self.second {
            Some(f) => f.to_u32("second", 0)?,
            None => vec![0],
        };
        let minutes = match &self.minute {
            Some(f) => f.to_u32("minute", 0)?,
            None => (0..60).collect(),
        };
        let hours = match &self.hour {
            Some(f) => f.to_u32("hour", 0)?,
            None => (0..24).collect(),
        };
        let days_of_month = self.date.as_ref().map(|f| f.to_u32("date", 0)).transpose()?;
        let months = self.month.as_ref().map(|f| f.to_u32("month", 1)).transpose()?;
        let days_of_week = self
            .day_of_week
            .as_ref()
            .map(|f| f.to_u32("dayOfWeek", 0))
            .transpose()?;
        let years = self
            .year
            .as_ref()
            .map(|f| {
                f.values("year")?
                    .into_iter()
                    .map(|y| {
                        i32::try_from(y).map_err(|_| {
                            SchedulerError::InvalidRule(format!("year {} out of range", y))
                        })
                    })
                    .collect::<Result<Vec<i32>, _>>()
            })
            .transpose()?;

        Calendar::new(
            seconds,
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            years,
            DayMatch::All,
        )
    }
}

/// When a task runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    /// Daily at this hour (minute 0, second 0).
    Hour(i64),
    /// Cron expression, 5 or 6 fields.
    Cron(String),
    Rule(RecurrenceRule),
}

impl Schedule {
    /// Rewrites an hour-of-day schedule into its daily recurrence rule; other forms pass through.
    pub fn normalize(&self) -> Schedule {
        match self {
            Schedule::Hour(hour) => Schedule::Rule(RecurrenceRule::daily_at(*hour)),
            other => other.clone(),
        }
    }

    /// Resolves the schedule into a calendar, validating every field.
    pub fn calendar(&self) -> Result<Calendar, SchedulerError> {
        match self {
            Schedule::Hour(hour) => {
                let hour = u32::try_from(*hour).map_err(|_| {
                    SchedulerError::InvalidRule(format!("hour value {} out of range", hour))
                })?;
                Calendar::daily_at(hour)
            }
            Schedule::Cron(expr) => Ok(CronExpr::parse(expr)?.calendar().clone()),
            Schedule::Rule(rule) => rule.calendar(),
        }
    }
}

impl From<i64> for Schedule {
    fn from(hour: i64) -> Self {
        Schedule::Hour(hour)
    }
}

impl From<&str> for Schedule {
    fn from(expr: &str) -> Self {
        Schedule::Cron(expr.to_string())
    }
}

impl From<RecurrenceRule> for Schedule {
    fn from(rule: RecurrenceRule) -> Self {
        Schedule::Rule(rule)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Hour(hour) => write!(f, "{}", hour),
            Schedule::Cron(expr) => f.write_str(expr),
            Schedule::Rule(rule) => match serde_json::to_string(rule) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{:?}", rule),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_json_forms() {
        let hour: Schedule = serde_json::from_value(json!(9)).unwrap();
        assert_eq!(hour, Schedule::Hour(9));

        let cron: Schedule = serde_json::from_value(json!("0 */2 * * *")).unwrap();
        assert_eq!(cron, Schedule::Cron("0 */2 * * *".to_string()));

        let rule: Schedule =
            serde_json::from_value(json!({"hour": 8, "minute": [0, 30], "dayOfWeek": {"start": 1, "end": 5}}))
                .unwrap();
        match rule {
            Schedule::Rule(r) => {
                assert_eq!(r.hour, Some(RuleField::One(8)));
                assert_eq!(r.minute, Some(RuleField::Many(vec![0, 30])));
                assert_eq!(
                    r.day_of_week,
                    Some(RuleField::Range { start: 1, end: 5, step: None })
                );
            }
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_hour_to_daily_rule() {
        let normalized = Schedule::Hour(9).normalize();
        assert_eq!(normalized, Schedule::Rule(RecurrenceRule::daily_at(9)));
        let cron = Schedule::from("0 0 * * *");
        assert_eq!(cron.normalize(), cron);
    }

    #[test]
    fn test_hour_calendar_matches_daily_rule() {
        for hour in [0, 9, 23] {
            assert_eq!(
                Schedule::Hour(hour).calendar().unwrap(),
                RecurrenceRule::daily_at(hour).calendar().unwrap()
            );
        }
        assert!(matches!(Schedule::Hour(-3).calendar(), Err(SchedulerError::InvalidRule(_))));
        assert!(matches!(Schedule::Hour(24).calendar(), Err(SchedulerError::InvalidRule(_))));
    }

    #[test]
    fn test_invalid_values_rejected_by_calendar() {
        assert!(Schedule::Hour(25).calendar().is_err());
        assert!(Schedule::Hour(-1).calendar().is_err());
        let bad_month = RecurrenceRule { month: Some(RuleField::One(12)), ..Default::default() };
        assert!(bad_month.calendar().is_err());
        assert!(Schedule::Cron("not a cron".to_string()).calendar().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Schedule::Hour(9).to_string(), "9");
        assert_eq!(Schedule::from("*/5 * * * *").to_string(), "*/5 * * * *");
        assert_eq!(Schedule::Rule(RecurrenceRule::daily_at(7)).to_string(), r#"{"second":0,"minute":0,"hour":7}"#);
    }
}
