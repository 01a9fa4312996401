//! Tests for batch scheduling: pool bounds, completeness, cancellation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{orchestrator, profile, MockBackend, Script};
use relayllm::{FailureKind, GenerationTask, RoleTag, TaskIntent, TaskStatus};

fn bulk_tasks(n: usize) -> Vec<GenerationTask> {
    (0..n)
        .map(|i| GenerationTask::new(format!("t{}", i), "seed content").intent(TaskIntent::Bulk))
        .collect()
}

// ============================================================================
// Completeness and pool bound
// ============================================================================

#[tokio::test]
async fn batch_of_ten_under_pool_of_three() {
    let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(20)));

    let orch = orchestrator(vec![profile("bulk", RoleTag::Bulk, 1.0)], backend.clone(), 3);
    let report = orch
        .submit(orch.batch(bulk_tasks(10)).concurrency(3))
        .await;

    // Exactly one terminal result per task.
    assert_eq!(report.results.len(), 10);
    assert!(report.results.iter().all(|r| r.status == TaskStatus::Succeeded));
    assert!(report.results.iter().all(|r| r.attempt_count() == 1));
    // Never more in-flight attempts than pool slots.
    assert!(backend.max_in_flight() <= 3);
    assert_eq!(report.metrics.tasks_succeeded, 10);
    assert_eq!(report.metrics.attempts, 10);
}

#[tokio::test]
async fn every_submitted_task_gets_exactly_one_result() {
    let backend = Arc::new(MockBackend::new());
    // Mixed outcomes: success, fatal, exhaustion.
    backend.script("t1", "only", vec![Script::Fail(FailureKind::ContentPolicy)]);
    backend.script(
        "t2",
        "only",
        vec![
            Script::Fail(FailureKind::TransientNetwork),
            Script::Fail(FailureKind::TransientNetwork),
        ],
    );

    let orch = orchestrator(vec![profile("only", RoleTag::Bulk, 1.0)], backend, 2);
    let report = orch.submit(orch.batch(bulk_tasks(4))).await;

    assert_eq!(report.results.len(), 4);
    let mut ids: Vec<&str> = report.results.iter().map(|r| r.task_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["t0", "t1", "t2", "t3"]);
    assert_eq!(report.result_for("t1").unwrap().status, TaskStatus::Fatal);
    assert_eq!(report.result_for("t2").unwrap().status, TaskStatus::Exhausted);
    assert_eq!(report.result_for("t0").unwrap().status, TaskStatus::Succeeded);
    assert_eq!(report.metrics.tasks_finished(), 4);
}

#[tokio::test]
async fn one_task_failure_does_not_affect_others() {
    let backend = Arc::new(MockBackend::new());
    backend.script("t0", "only", vec![Script::Fail(FailureKind::ContentPolicy)]);

    let orch = orchestrator(vec![profile("only", RoleTag::Bulk, 1.0)], backend, 2);
    let report = orch.submit(orch.batch(bulk_tasks(5)).concurrency(2)).await;

    assert_eq!(report.results.len(), 5);
    let succeeded = report
        .results
        .iter()
        .filter(|r| r.status == TaskStatus::Succeeded)
        .count();
    assert_eq!(succeeded, 4);
}

#[tokio::test]
async fn higher_priority_tasks_are_admitted_first() {
    let backend = Arc::new(MockBackend::new());

    let mut tasks = bulk_tasks(3);
    tasks[2] = tasks[2].clone().priority(9);

    // Pool of one serializes admission, making order observable.
    let orch = orchestrator(vec![profile("only", RoleTag::Bulk, 1.0)], backend.clone(), 2);
    let report = orch.submit(orch.batch(tasks).concurrency(1)).await;

    assert_eq!(report.results.len(), 3);
    let first_call = &backend.calls()[0];
    assert_eq!(first_call.0, "t2");
}

// ============================================================================
// Batch-scoped quota memory
// ============================================================================

#[tokio::test]
async fn quota_dead_profile_is_skipped_for_rest_of_batch() {
    let backend = Arc::new(MockBackend::new());
    backend.script("t0", "primary", vec![Script::Fail(FailureKind::QuotaExhausted)]);

    // Pool of one: t0 runs first, kills "primary", later tasks skip it.
    let orch = orchestrator(
        vec![
            profile("primary", RoleTag::Bulk, 1.0),
            profile("fallback", RoleTag::Bulk, 2.0),
        ],
        backend.clone(),
        3,
    );
    let report = orch.submit(orch.batch(bulk_tasks(3)).concurrency(1)).await;

    assert!(report.results.iter().all(|r| r.status == TaskStatus::Succeeded));
    let primary_calls = backend
        .calls()
        .iter()
        .filter(|(_, p)| p == "primary")
        .count();
    assert_eq!(primary_calls, 1);
    // t1 and t2 went straight to the fallback.
    assert_eq!(report.result_for("t1").unwrap().profiles_tried(), vec!["fallback"]);
    assert_eq!(report.result_for("t2").unwrap().profiles_tried(), vec!["fallback"]);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn cancel_before_submit_admits_nothing() {
    let backend = Arc::new(MockBackend::new());

    let orch = orchestrator(vec![profile("only", RoleTag::Bulk, 1.0)], backend.clone(), 2);
    let job = orch.batch(bulk_tasks(4));
    job.handle().cancel();
    let report = orch.submit(job).await;

    assert!(report.cancelled);
    assert!(report.results.is_empty());
    assert_eq!(report.metrics.admissions_skipped, 4);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn cancel_mid_batch_drains_admitted_tasks() {
    let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(200)));

    let orch = orchestrator(vec![profile("only", RoleTag::Bulk, 1.0)], backend, 2);
    let job = orch.batch(bulk_tasks(6)).concurrency(1);
    let handle = job.handle();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let report = orch.submit(job).await;
    canceller.await.unwrap();

    assert!(report.cancelled);
    // Admitted tasks drained to terminal states, the rest were skipped.
    assert!(!report.results.is_empty());
    assert!(report.results.len() < 6);
    assert!(report.results.iter().all(|r| r.status == TaskStatus::Succeeded));
    assert_eq!(
        report.results.len() as u64 + report.metrics.admissions_skipped,
        6
    );
}

#[tokio::test]
async fn live_metrics_are_visible_through_the_handle() {
    let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(50)));

    let orch = orchestrator(vec![profile("only", RoleTag::Bulk, 1.0)], backend, 2);
    let job = orch.batch(bulk_tasks(4)).concurrency(2);
    let handle = job.handle();

    assert_eq!(handle.metrics().attempts, 0);
    let report = orch.submit(job).await;

    assert_eq!(handle.metrics().attempts, 4);
    assert_eq!(handle.metrics(), report.metrics);
}
