//! Job scheduler seam: schedule-by-name, cancel-by-name, and the handle returned for a registered job.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use futures::future::BoxFuture;

use crate::error::SchedulerError;
use crate::schedule::Schedule;

/// Invoked on every firing; the returned future is spawned so slow jobs never delay the timer.
pub type JobCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle to a registered job. Cloning shares the next-invocation slot with the running timer.
#[derive(Clone)]
pub struct JobHandle {
    name: String,
    next: Arc<Mutex<Option<DateTime<Local>>>>,
}

impl JobHandle {
    pub fn new(name: impl Into<String>, next: Option<DateTime<Local>>) -> Self {
        Self {
            name: name.into(),
            next: Arc::new(Mutex::new(next)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next time the job fires; `None` once the schedule is exhausted.
    pub fn next_invocation(&self) -> Option<DateTime<Local>> {
        match self.next.lock() {
            Ok(next) => *next,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// True when both handles belong to the same registration, not just the same name.
    pub(crate) fn same_job(&self, other: &JobHandle) -> bool {
        Arc::ptr_eq(&self.next, &other.next)
    }

    pub(crate) fn set_next(&self, next: Option<DateTime<Local>>) {
        match self.next.lock() {
            Ok(mut slot) => *slot = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("name", &self.name)
            .field("next", &self.next_invocation())
            .finish()
    }
}

/// Process-wide registry of named recurring jobs.
pub trait JobScheduler: Send + Sync {
    /// Registers `callback` under `name`. A job already registered under `name` is replaced.
    fn schedule_job(
        &self,
        name: &str,
        schedule: &Schedule,
        callback: JobCallback,
    ) -> Result<JobHandle, SchedulerError>;

    /// Cancels the job registered under `name`. Returns false when there was none.
    fn cancel_job(&self, name: &str) -> bool;

    /// Names of all active jobs, sorted.
    fn scheduled_jobs(&self) -> Vec<String>;

    /// Handle of the active job registered under `name`.
    fn job(&self, name: &str) -> Option<JobHandle>;
}
