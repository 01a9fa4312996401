use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::constants;
use crate::errors::FailureKind;
use crate::executor::http::{AttemptOutcome, GenerationBackend};
use crate::executor::wire::TokenUsage;
use crate::metrics::BatchMetrics;
use crate::orchestrator::backoff::BackoffPolicy;
use crate::orchestrator::tasks::GenerationTask;
use crate::orchestrator::types::{GenerationAttempt, GenerationResult, TaskStatus};
use crate::registry::profile::ModelProfile;

/// Retry and escalation limits for one task.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts on a single profile before escalating.
    pub retries_per_profile: usize,
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries_per_profile: constants::DEFAULT_RETRIES_PER_PROFILE,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// States of the per-task control loop.
///
/// `Succeeded`, `Exhausted` and `Fatal` are terminal; the others are
/// transient and only visible in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Pending,
    Attempting,
    Retrying,
    Escalating,
    Succeeded,
    Exhausted,
    Fatal,
}

/// Profiles ruled out for the remainder of a batch.
///
/// A profile that reports quota exhaustion stays here until the batch
/// ends; later tasks skip it instead of burning an attempt.
pub type DeadProfiles = Mutex<HashSet<String>>;

/// Drives one task through its fallback chain.
///
/// The controller is the sole decision point for retry vs escalate vs
/// fatal. It consumes [`FailureKind`] data from the backend and never
/// re-parses error text. Attempts on a single task are strictly
/// sequential; concurrency lives a level up, in the scheduler.
pub struct RetryController {
    backend: Arc<dyn GenerationBackend + Send + Sync>,
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(backend: Arc<dyn GenerationBackend + Send + Sync>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Run the task to a terminal state and return its result.
    ///
    /// Every call to the backend appends one [`GenerationAttempt`] to the
    /// history, so the caller can reconstruct the whole path afterwards.
    /// For a task that never succeeds the attempt count is bounded by
    /// `retries_per_profile * chain length`.
    pub async fn run(
        &self,
        task: &GenerationTask,
        chain: &[Arc<ModelProfile>],
        dead_profiles: &DeadProfiles,
        metrics: &BatchMetrics,
    ) -> GenerationResult {
        let usable: Vec<Arc<ModelProfile>> = {
            let dead = dead_profiles.lock().await;
            chain.iter().filter(|p| !dead.contains(&p.id)).cloned().collect()
        };

        let intent = task.intent.to_string();
        let mut attempts: Vec<GenerationAttempt> = Vec::new();
        let mut total_latency = Duration::ZERO;
        let mut state = ControlState::Pending;
        debug!(
            "Task '{}' -> {:?} with chain of {} profile(s)",
            task.id,
            state,
            usable.len()
        );

        for (idx, profile) in usable.iter().enumerate() {
            let has_next = idx + 1 < usable.len();
            let mut tries_on_profile = 0;

            loop {
                tries_on_profile += 1;
                state = ControlState::Attempting;
                debug!(
                    "Task '{}' -> {:?} on '{}' (try {}/{})",
                    task.id, state, profile.id, tries_on_profile, self.policy.retries_per_profile
                );

                let outcome = self.backend.execute(profile, task).await;
                total_latency += outcome.latency();
                attempts.push(attempt_record(task, profile, attempts.len() + 1, &outcome));

                match outcome {
                    AttemptOutcome::Success { content, usage, latency } => {
                        metrics.attempt_succeeded(
                            &profile.id,
                            &intent,
                            latency,
                            &usage,
                            profile.cost_weight,
                        );
                        metrics.task_finished(TaskStatus::Succeeded);
                        info!(
                            "Task '{}' succeeded on '{}' after {} attempt(s)",
                            task.id,
                            profile.id,
                            attempts.len()
                        );
                        return finish(task, attempts, total_latency, TaskStatus::Succeeded,
                            Some(content), Some(profile.id.clone()));
                    }
                    AttemptOutcome::Failure { kind, latency, .. } => {
                        metrics.attempt_failed(&profile.id, &intent, kind, latency);

                        if kind.is_fatal() {
                            state = ControlState::Fatal;
                            metrics.task_finished(TaskStatus::Fatal);
                            info!(
                                "Task '{}' -> {:?} on '{}' ({}) after {} attempt(s)",
                                task.id,
                                state,
                                profile.id,
                                kind,
                                attempts.len()
                            );
                            return finish(task, attempts, total_latency, TaskStatus::Fatal,
                                None, Some(profile.id.clone()));
                        }

                        if kind == FailureKind::QuotaExhausted {
                            dead_profiles.lock().await.insert(profile.id.clone());
                        }

                        if kind.exhausts_profile() {
                            if has_next {
                                state = ControlState::Escalating;
                                metrics.escalated(&profile.id);
                                debug!(
                                    "Task '{}' -> {:?}: '{}' unusable ({})",
                                    task.id, state, profile.id, kind
                                );
                            }
                            break;
                        }

                        // Retryable failure.
                        if tries_on_profile >= self.policy.retries_per_profile {
                            if has_next {
                                state = ControlState::Escalating;
                                metrics.escalated(&profile.id);
                                debug!(
                                    "Task '{}' -> {:?}: retries on '{}' exhausted",
                                    task.id, state, profile.id
                                );
                            }
                            break;
                        }

                        state = ControlState::Retrying;
                        metrics.retry_scheduled(&profile.id);
                        let delay = self.policy.backoff.delay(tries_on_profile);
                        debug!(
                            "Task '{}' -> {:?}: {} on '{}', backing off {:?}",
                            task.id, state, kind, profile.id, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        metrics.task_finished(TaskStatus::Exhausted);
        info!(
            "Task '{}' exhausted its fallback chain after {} attempt(s)",
            task.id,
            attempts.len()
        );
        let last_profile = attempts.last().map(|a| a.profile_id.clone());
        finish(task, attempts, total_latency, TaskStatus::Exhausted, None, last_profile)
    }
}

fn attempt_record(
    task: &GenerationTask,
    profile: &ModelProfile,
    attempt: usize,
    outcome: &AttemptOutcome,
) -> GenerationAttempt {
    match outcome {
        AttemptOutcome::Success { usage, latency, .. } => GenerationAttempt {
            task_id: task.id.clone(),
            profile_id: profile.id.clone(),
            attempt,
            success: true,
            failure: None,
            detail: None,
            latency: *latency,
            usage: Some(*usage),
        },
        AttemptOutcome::Failure { kind, detail, latency } => GenerationAttempt {
            task_id: task.id.clone(),
            profile_id: profile.id.clone(),
            attempt,
            success: false,
            failure: Some(*kind),
            detail: Some(detail.clone()),
            latency: *latency,
            usage: None,
        },
    }
}

fn finish(
    task: &GenerationTask,
    attempts: Vec<GenerationAttempt>,
    total_latency: Duration,
    status: TaskStatus,
    content: Option<String>,
    profile_id: Option<String>,
) -> GenerationResult {
    let usage = attempts
        .iter()
        .filter_map(|a| a.usage.as_ref())
        .fold(TokenUsage::default(), |acc, u| acc.add(u));

    GenerationResult {
        task_id: task.id.clone(),
        status,
        content,
        profile_id,
        attempts,
        total_latency,
        usage,
    }
}
