//! Tokio-backed [`JobScheduler`]: one timer task per job name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::calendar::Calendar;
use crate::error::SchedulerError;
use crate::job::{JobCallback, JobHandle, JobScheduler};
use crate::schedule::Schedule;

struct ScheduledJob {
    handle: JobHandle,
    task: JoinHandle<()>,
}

type JobTable = Mutex<HashMap<String, ScheduledJob>>;

fn lock(jobs: &JobTable) -> MutexGuard<'_, HashMap<String, ScheduledJob>> {
    match jobs.lock() {
        Ok(jobs) => jobs,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Runs jobs on the current tokio runtime. Dropping the scheduler aborts every job.
///
/// A job whose schedule runs out removes itself from the table after its last firing.
#[derive(Clone, Default)]
pub struct TokioScheduler {
    jobs: Arc<JobTable>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, ScheduledJob>> {
        lock(&self.jobs)
    }

    /// Cancels every job.
    pub fn shutdown(&self) {
        let mut jobs = self.jobs();
        for (name, job) in jobs.drain() {
            debug!(job = %name, "step: job aborted on shutdown");
            job.task.abort();
        }
    }
}

impl JobScheduler for TokioScheduler {
    fn schedule_job(
        &self,
        name: &str,
        schedule: &Schedule,
        callback: JobCallback,
    ) -> Result<JobHandle, SchedulerError> {
        let calendar = schedule.calendar()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| SchedulerError::NoRuntime(name.to_string()))?;
        let next = calendar
            .next_after(&Local::now())
            .ok_or_else(|| SchedulerError::NoUpcomingInvocation(name.to_string()))?;

        let handle = JobHandle::new(name, Some(next));
        // Held across spawn and insert so an immediately exhausted job cannot look itself up too early.
        let mut jobs = self.jobs();
        let task = runtime.spawn(run_job(
            name.to_string(),
            calendar,
            handle.clone(),
            callback,
            Arc::downgrade(&self.jobs),
        ));

        let previous = jobs.insert(
            name.to_string(),
            ScheduledJob {
                handle: handle.clone(),
                task,
            },
        );
        drop(jobs);
        if let Some(previous) = previous {
            warn!(job = %name, "Replacing job that was still scheduled");
            previous.task.abort();
        }

        info!(job = %name, schedule = %schedule, next = %next, "Job scheduled");
        Ok(handle)
    }

    fn cancel_job(&self, name: &str) -> bool {
        match self.jobs().remove(name) {
            Some(job) => {
                job.task.abort();
                info!(job = %name, "Job cancelled");
                true
            }
            None => false,
        }
    }

    fn scheduled_jobs(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs().keys().cloned().collect();
        names.sort();
        names
    }

    fn job(&self, name: &str) -> Option<JobHandle> {
        self.jobs().get(name).map(|job| job.handle.clone())
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        // Clones share the job table; only the last one tears it down.
        if Arc::strong_count(&self.jobs) == 1 {
            self.shutdown();
        }
    }
}

async fn run_job(
    name: String,
    calendar: Calendar,
    handle: JobHandle,
    callback: JobCallback,
    jobs: Weak<JobTable>,
) {
    while let Some(next) = handle.next_invocation() {
        let wait = (next - Local::now()).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        debug!(job = %name, fired_at = %next, "step: job fired");
        tokio::spawn(callback());

        let following = calendar.next_after(&next);
        handle.set_next(following);
    }

    info!(job = %name, "Job has no further invocations");
    if let Some(jobs) = jobs.upgrade() {
        let mut jobs = lock(&jobs);
        // The name may already belong to a newer registration.
        if jobs.get(&name).is_some_and(|job| job.handle.same_job(&handle)) {
            jobs.remove(&name);
        }
    }
}
