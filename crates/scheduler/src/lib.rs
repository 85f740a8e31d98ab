//! # Scheduler
//!
//! Named recurring jobs driven by tokio timers.
//!
//! A [`Schedule`] is either a plain hour of the day, a [`RecurrenceRule`] object, or a cron expression.
//! Each resolves to a [`Calendar`] that computes the next invocation after a given instant.
//! [`JobScheduler`] is the seam the bot loader depends on; [`TokioScheduler`] runs one tokio task per job
//! and keeps at most one job per name.
//!
//! ```text
//! schedule_job("digest", 9, cb)      -> daily at 09:00:00
//! schedule_job("poll", "*/15 * * * *", cb)
//! cancel_job("digest")               -> aborts the timer task
//! ```

mod calendar;
mod cron;
mod error;
mod humanize;
mod job;
mod schedule;
mod tokio_scheduler;

pub use calendar::Calendar;
pub use cron::CronExpr;
pub use error::SchedulerError;
pub use humanize::from_now;
pub use job::{JobCallback, JobHandle, JobScheduler};
pub use schedule::{RecurrenceRule, RuleField, Schedule};
pub use tokio_scheduler::TokioScheduler;
