//! Scheduled tasks contributed by modules, and their reconciliation with the job scheduler.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use futures::FutureExt;
use scheduler::{from_now, JobCallback, JobScheduler, Schedule};
use tracing::{debug, error, info, warn};

use crate::loader::{BotTemplates, WeakBot};

/// Work run each time a task's schedule fires. Receives the live loader.
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn run(&self, bot: BotTemplates) -> anyhow::Result<()>;
}

struct FnAction<F>(F);

#[async_trait]
impl<F, Fut> TaskAction for FnAction<F>
where
    F: Fn(BotTemplates) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn run(&self, bot: BotTemplates) -> anyhow::Result<()> {
        (self.0)(bot).await
    }
}

/// Named recurring job definition. The name is the scheduler key.
#[derive(Clone)]
pub struct TaskNode {
    pub name: String,
    pub schedule: Schedule,
    pub action: Arc<dyn TaskAction>,
}

impl TaskNode {
    pub fn new(name: impl Into<String>, schedule: impl Into<Schedule>, action: Arc<dyn TaskAction>) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            action,
        }
    }

    /// Task from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, schedule: impl Into<Schedule>, f: F) -> Self
    where
        F: Fn(BotTemplates) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::new(name, schedule, Arc::new(FnAction(f)))
    }
}

impl fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// A job registered during reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub name: String,
    /// Schedule as handed to the scheduler (hours already rewritten to daily rules).
    pub schedule: Schedule,
    pub next_invocation: Option<DateTime<Local>>,
}

#[derive(Debug, Default)]
pub(crate) struct Reconciliation {
    pub scheduled: Vec<ScheduledTask>,
    pub failed: Vec<(String, String)>,
    pub cancelled: Vec<String>,
}

/// Registers every task with `scheduler`, replacing same-named jobs, and cancels `previous` jobs
/// whose names no longer appear in `tasks`.
pub(crate) fn reconcile(
    scheduler: &dyn JobScheduler,
    tasks: &HashMap<String, TaskNode>,
    previous: &[String],
    bot: &WeakBot,
) -> Reconciliation {
    let mut outcome = Reconciliation::default();

    for name in previous {
        if !tasks.contains_key(name) && scheduler.cancel_job(name) {
            info!(job = %name, "Cancelled job no longer in blueprint");
            outcome.cancelled.push(name.clone());
        }
    }

    let mut names: Vec<&String> = tasks.keys().collect();
    names.sort();
    for name in names {
        let task = &tasks[name];
        scheduler.cancel_job(name);

        let schedule = task.schedule.normalize();
        info!("Subscription time: {}", schedule);

        match scheduler.schedule_job(name, &schedule, job_callback(task, bot.clone())) {
            Ok(handle) => {
                let next_invocation = handle.next_invocation();
                match next_invocation {
                    Some(next) => info!("Schedule Job {}: {}", name, from_now(&next, &Local::now())),
                    None => info!("Schedule Job {}: never", name),
                }
                outcome.scheduled.push(ScheduledTask {
                    name: name.clone(),
                    schedule,
                    next_invocation,
                });
            }
            Err(e) => {
                warn!(job = %name, error = %e, "Failed to schedule job");
                outcome.failed.push((name.clone(), e.to_string()));
            }
        }
    }

    outcome
}

fn job_callback(task: &TaskNode, bot: WeakBot) -> JobCallback {
    let name = task.name.clone();
    let action = Arc::clone(&task.action);
    Arc::new(move || {
        let name = name.clone();
        let action = Arc::clone(&action);
        let bot = bot.clone();
        async move {
            let Some(bot) = bot.upgrade() else {
                debug!(job = %name, "Bot dropped, skipping job");
                return;
            };
            info!(job = %name, "step: job started");
            match action.run(bot).await {
                Ok(()) => info!(job = %name, "step: job done"),
                Err(e) => error!(job = %name, error = %e, "Job failed"),
            }
        }
        .boxed()
    })
}
