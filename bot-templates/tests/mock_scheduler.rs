//! Recording `JobScheduler` for loader tests.
//!
//! Keeps registered callbacks instead of running timers; tests fire them by hand with [`RecordingScheduler::fire`].
//! Every call is appended to an operation log (`"cancel:<name>"`, `"schedule:<name>"`).

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Local;
use scheduler::{JobCallback, JobHandle, JobScheduler, Schedule, SchedulerError};

struct Registered {
    schedule: Schedule,
    callback: JobCallback,
    handle: JobHandle,
}

#[derive(Default)]
pub struct RecordingScheduler {
    jobs: Mutex<HashMap<String, Registered>>,
    ops: Mutex<Vec<String>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Schedule the job was registered with, if active.
    pub fn schedule_of(&self, name: &str) -> Option<Schedule> {
        self.jobs.lock().unwrap().get(name).map(|j| j.schedule.clone())
    }

    /// Runs the job's callback once. Returns false when no such job is active.
    pub async fn fire(&self, name: &str) -> bool {
        let callback = self.jobs.lock().unwrap().get(name).map(|j| j.callback.clone());
        match callback {
            Some(callback) => {
                callback().await;
                true
            }
            None => false,
        }
    }
}

impl JobScheduler for RecordingScheduler {
    fn schedule_job(
        &self,
        name: &str,
        schedule: &Schedule,
        callback: JobCallback,
    ) -> Result<JobHandle, SchedulerError> {
        self.ops.lock().unwrap().push(format!("schedule:{}", name));
        let calendar = schedule.calendar()?;
        let handle = JobHandle::new(name, calendar.next_after(&Local::now()));
        self.jobs.lock().unwrap().insert(
            name.to_string(),
            Registered {
                schedule: schedule.clone(),
                callback,
                handle: handle.clone(),
            },
        );
        Ok(handle)
    }

    fn cancel_job(&self, name: &str) -> bool {
        self.ops.lock().unwrap().push(format!("cancel:{}", name));
        self.jobs.lock().unwrap().remove(name).is_some()
    }

    fn scheduled_jobs(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    fn job(&self, name: &str) -> Option<JobHandle> {
        self.jobs.lock().unwrap().get(name).map(|j| j.handle.clone())
    }
}
