//! Integration tests for [`scheduler::TokioScheduler`]: one job per name, cancellation, and firing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local, Timelike};
use futures::FutureExt;
use scheduler::{
    JobCallback, JobScheduler, RecurrenceRule, RuleField, Schedule, SchedulerError, TokioScheduler,
};

fn counting_callback(counter: Arc<AtomicUsize>) -> JobCallback {
    Arc::new(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    })
}

fn noop() -> JobCallback {
    Arc::new(|| async {}.boxed())
}

/// **Test: Scheduling the same name twice keeps a single job.**
///
/// **Setup:** Empty scheduler.
/// **Action:** schedule "digest" at hour 9, then at hour 10.
/// **Expected:** one job named "digest", whose next invocation is at 10:00:00.
#[tokio::test]
async fn test_same_name_replaces_job() {
    let scheduler = TokioScheduler::new();
    scheduler.schedule_job("digest", &Schedule::Hour(9), noop()).unwrap();
    scheduler.schedule_job("digest", &Schedule::Hour(10), noop()).unwrap();

    assert_eq!(scheduler.scheduled_jobs(), vec!["digest".to_string()]);
    let next = scheduler.job("digest").unwrap().next_invocation().unwrap();
    assert_eq!((next.hour(), next.minute(), next.second()), (10, 0, 0));
    assert!(next > Local::now());
}

/// **Test: cancel_job removes the job and is a no-op for unknown names.**
#[tokio::test]
async fn test_cancel_job() {
    let scheduler = TokioScheduler::new();
    scheduler.schedule_job("a", &Schedule::from("0 * * * *"), noop()).unwrap();

    assert!(scheduler.cancel_job("a"));
    assert!(!scheduler.cancel_job("a"));
    assert!(!scheduler.cancel_job("never-scheduled"));
    assert!(scheduler.scheduled_jobs().is_empty());
    assert!(scheduler.job("a").is_none());
}

/// **Test: Invalid schedules are rejected and nothing is registered.**
#[tokio::test]
async fn test_invalid_schedule_rejected() {
    let scheduler = TokioScheduler::new();
    let err = scheduler
        .schedule_job("bad", &Schedule::Hour(42), noop())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidRule(_)));
    assert!(scheduler.scheduled_jobs().is_empty());
}

/// **Test: Scheduling outside a tokio runtime fails without panicking.**
#[test]
fn test_schedule_without_runtime() {
    let scheduler = TokioScheduler::new();
    let err = scheduler
        .schedule_job("x", &Schedule::Hour(9), noop())
        .unwrap_err();
    assert_eq!(err, SchedulerError::NoRuntime("x".to_string()));
}

/// **Test: An every-second job fires, and stops firing once cancelled.**
///
/// **Setup:** six-field cron `* * * * * *` with a counting callback.
/// **Action:** wait ~2.5s, cancel, wait another 1.5s.
/// **Expected:** at least one firing before cancel; no firings after cancel.
#[tokio::test]
async fn test_job_fires_and_stops_after_cancel() {
    let scheduler = TokioScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let handle = scheduler
        .schedule_job("tick", &Schedule::from("* * * * * *"), counting_callback(counter.clone()))
        .unwrap();
    assert!(handle.next_invocation().is_some());

    tokio::time::sleep(Duration::from_millis(2500)).await;
    let fired = counter.load(Ordering::SeqCst);
    assert!(fired >= 1, "expected at least one firing, got {}", fired);

    assert!(scheduler.cancel_job("tick"));
    // Let any callback spawned right before cancel finish.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after_cancel = counter.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
}

/// **Test: shutdown aborts all jobs.**
#[tokio::test]
async fn test_shutdown_clears_jobs() {
    let scheduler = TokioScheduler::new();
    scheduler.schedule_job("a", &Schedule::Hour(1), noop()).unwrap();
    scheduler.schedule_job("b", &Schedule::Hour(2), noop()).unwrap();
    assert_eq!(scheduler.scheduled_jobs(), vec!["a".to_string(), "b".to_string()]);

    scheduler.shutdown();
    assert!(scheduler.scheduled_jobs().is_empty());
}

/// **Test: A job whose schedule runs out fires once and then leaves the job table.**
///
/// **Setup:** rule pinned to a single instant two seconds ahead (year, month, date, hour, minute, second).
/// **Action:** wait for it to fire.
/// **Expected:** one firing; no scheduled jobs and no handle for the name afterwards.
#[tokio::test]
async fn test_exhausted_job_is_removed() {
    let scheduler = TokioScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));
    let at = Local::now() + chrono::Duration::seconds(2);
    let once = RecurrenceRule {
        second: Some(RuleField::One(i64::from(at.second()))),
        minute: Some(RuleField::One(i64::from(at.minute()))),
        hour: Some(RuleField::One(i64::from(at.hour()))),
        date: Some(RuleField::One(i64::from(at.day()))),
        month: Some(RuleField::One(i64::from(at.month0()))),
        year: Some(RuleField::One(i64::from(at.year()))),
        ..Default::default()
    };
    let handle = scheduler
        .schedule_job("once", &Schedule::from(once), counting_callback(counter.clone()))
        .unwrap();
    assert_eq!(scheduler.scheduled_jobs(), vec!["once".to_string()]);

    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(handle.next_invocation().is_none());
    assert!(scheduler.scheduled_jobs().is_empty());
    assert!(scheduler.job("once").is_none());
    assert!(!scheduler.cancel_job("once"));
}
