//! Scheduler error types.

use thiserror::Error;

/// Errors raised while building a calendar or registering a job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("Job {0} has no upcoming invocation")]
    NoUpcomingInvocation(String),

    #[error("No tokio runtime available to run job {0}")]
    NoRuntime(String),
}
