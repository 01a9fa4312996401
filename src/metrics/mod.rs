//! Batch metrics aggregation
//!
//! [`BatchMetrics`] is the one mutable structure shared across a batch.
//! All fields are atomic counters: workers increment without blocking
//! and nothing in the pipeline ever waits on metrics. A serializable
//! [`MetricsSnapshot`] can be taken at any point, including while the
//! batch is still running.
//!
//! With the `metrics` feature enabled, the aggregator additionally emits
//! through the `metrics` crate facade so an exporter of the caller's
//! choice (Prometheus or otherwise) can scrape the same figures.

pub mod labels;
#[cfg(feature = "metrics")]
mod recorder;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::FailureKind;
use crate::executor::wire::TokenUsage;
use crate::orchestrator::types::TaskStatus;

/// Metric name constants
pub mod names {
    /// Total number of generation attempts
    pub const ATTEMPTS_TOTAL: &str = "relay_attempts_total";
    /// Attempt duration in seconds
    pub const ATTEMPT_DURATION: &str = "relay_attempt_duration_seconds";
    /// Total prompt tokens consumed
    pub const TOKENS_PROMPT: &str = "relay_tokens_prompt_total";
    /// Total completion tokens generated
    pub const TOKENS_COMPLETION: &str = "relay_tokens_completion_total";
    /// Total failures by kind
    pub const FAILURES_TOTAL: &str = "relay_failures_total";
    /// Total retries on the same profile
    pub const RETRIES_TOTAL: &str = "relay_retries_total";
    /// Total escalations to the next profile in a chain
    pub const ESCALATIONS_TOTAL: &str = "relay_escalations_total";
    /// Tasks finished by terminal status
    pub const TASKS_TOTAL: &str = "relay_tasks_total";
}

/// Per-batch metrics aggregator.
///
/// Concurrency discipline: atomic increments only, `Relaxed` ordering —
/// counters are statistics, not synchronization.
#[derive(Debug, Default)]
pub struct BatchMetrics {
    attempts: AtomicU64,
    attempt_successes: AtomicU64,
    retries: AtomicU64,
    escalations: AtomicU64,
    tasks_succeeded: AtomicU64,
    tasks_exhausted: AtomicU64,
    tasks_fatal: AtomicU64,
    admissions_skipped: AtomicU64,
    latency_ms: AtomicU64,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    /// Weighted token volume in micro cost units; see `snapshot`.
    cost_avoided_micro: AtomicU64,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful attempt.
    pub fn attempt_succeeded(
        &self,
        profile_id: &str,
        intent: &str,
        latency: Duration,
        usage: &TokenUsage,
        cost_weight: f32,
    ) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.attempt_successes.fetch_add(1, Ordering::Relaxed);
        self.latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
        self.prompt_tokens
            .fetch_add(usage.prompt_tokens as u64, Ordering::Relaxed);
        self.completion_tokens
            .fetch_add(usage.completion_tokens as u64, Ordering::Relaxed);

        // Cost weight is taken as relative list price per 1K tokens, so a
        // sponsored (zero marginal cost) call avoids weight * tokens / 1000
        // cost units. Stored in integer micro-units to stay atomic.
        let micro = (usage.total_tokens as f64 * cost_weight as f64 * 1000.0).round() as u64;
        self.cost_avoided_micro.fetch_add(micro, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        recorder::record_attempt_success(profile_id, intent, latency, usage);
        #[cfg(not(feature = "metrics"))]
        let _ = (profile_id, intent);
    }

    /// Record a failed attempt.
    pub fn attempt_failed(
        &self,
        profile_id: &str,
        intent: &str,
        kind: FailureKind,
        latency: Duration,
    ) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        recorder::record_attempt_failure(profile_id, intent, kind, latency);
        #[cfg(not(feature = "metrics"))]
        let _ = (profile_id, intent, kind);
    }

    /// Record a scheduled retry on the same profile.
    pub fn retry_scheduled(&self, profile_id: &str) {
        self.retries.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        recorder::record_retry(profile_id);
        #[cfg(not(feature = "metrics"))]
        let _ = profile_id;
    }

    /// Record an escalation to the next profile in a fallback chain.
    pub fn escalated(&self, from_profile_id: &str) {
        self.escalations.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        recorder::record_escalation(from_profile_id);
        #[cfg(not(feature = "metrics"))]
        let _ = from_profile_id;
    }

    /// Record a task reaching its terminal state.
    pub fn task_finished(&self, status: TaskStatus) {
        let counter = match status {
            TaskStatus::Succeeded => &self.tasks_succeeded,
            TaskStatus::Exhausted => &self.tasks_exhausted,
            TaskStatus::Fatal => &self.tasks_fatal,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        recorder::record_task_finished(status);
    }

    /// Record a task that was never admitted because the batch was
    /// cancelled first.
    pub fn admission_skipped(&self) {
        self.admissions_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot. Safe to call while the batch runs;
    /// counters read independently, so a snapshot taken mid-flight may be
    /// off by in-progress increments.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let attempts = self.attempts.load(Ordering::Relaxed);
        MetricsSnapshot {
            attempts,
            attempt_successes: self.attempt_successes.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            escalations: self.escalations.load(Ordering::Relaxed),
            tasks_succeeded: self.tasks_succeeded.load(Ordering::Relaxed),
            tasks_exhausted: self.tasks_exhausted.load(Ordering::Relaxed),
            tasks_fatal: self.tasks_fatal.load(Ordering::Relaxed),
            admissions_skipped: self.admissions_skipped.load(Ordering::Relaxed),
            total_latency_ms: self.latency_ms.load(Ordering::Relaxed),
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            cost_avoided: self.cost_avoided_micro.load(Ordering::Relaxed) as f64 / 1_000_000.0,
        }
    }
}

/// Plain-data view of [`BatchMetrics`] at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    pub attempts: u64,
    pub attempt_successes: u64,
    pub retries: u64,
    pub escalations: u64,
    pub tasks_succeeded: u64,
    pub tasks_exhausted: u64,
    pub tasks_fatal: u64,
    pub admissions_skipped: u64,
    pub total_latency_ms: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Estimated cost units avoided by serving requests under a
    /// sponsored allowance instead of list price.
    pub cost_avoided: f64,
}

impl MetricsSnapshot {
    /// Total tasks that reached a terminal state.
    pub fn tasks_finished(&self) -> u64 {
        self.tasks_succeeded + self.tasks_exhausted + self.tasks_fatal
    }
}

/// Describe all metrics with their units and descriptions.
/// Call this after setting up your metrics exporter for better discovery.
#[cfg(feature = "metrics")]
pub fn describe_metrics() {
    use metrics::{describe_counter, describe_histogram, Unit};

    describe_counter!(
        names::ATTEMPTS_TOTAL,
        Unit::Count,
        "Total number of generation attempts"
    );
    describe_histogram!(
        names::ATTEMPT_DURATION,
        Unit::Seconds,
        "Attempt duration in seconds"
    );
    describe_counter!(
        names::TOKENS_PROMPT,
        Unit::Count,
        "Total prompt tokens consumed"
    );
    describe_counter!(
        names::TOKENS_COMPLETION,
        Unit::Count,
        "Total completion tokens generated"
    );
    describe_counter!(
        names::FAILURES_TOTAL,
        Unit::Count,
        "Total failures by kind"
    );
    describe_counter!(
        names::RETRIES_TOTAL,
        Unit::Count,
        "Total retries on the same profile"
    );
    describe_counter!(
        names::ESCALATIONS_TOTAL,
        Unit::Count,
        "Total escalations to the next profile"
    );
    describe_counter!(
        names::TASKS_TOTAL,
        Unit::Count,
        "Tasks finished by terminal status"
    );
}
