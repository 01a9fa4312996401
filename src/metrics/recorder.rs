//! Metric recording functions for the `metrics` crate facade

use std::time::Duration;

use crate::errors::FailureKind;
use crate::executor::wire::TokenUsage;
use crate::orchestrator::types::TaskStatus;

use super::{labels, names};

/// Record a successful generation attempt
pub fn record_attempt_success(
    profile_id: &str,
    intent: &str,
    duration: Duration,
    usage: &TokenUsage,
) {
    metrics::counter!(
        names::ATTEMPTS_TOTAL,
        labels::keys::PROFILE => profile_id.to_string(),
        labels::keys::INTENT => intent.to_string()
    )
    .increment(1);

    metrics::histogram!(
        names::ATTEMPT_DURATION,
        labels::keys::PROFILE => profile_id.to_string(),
        labels::keys::INTENT => intent.to_string()
    )
    .record(duration.as_secs_f64());

    metrics::counter!(
        names::TOKENS_PROMPT,
        labels::keys::PROFILE => profile_id.to_string()
    )
    .increment(usage.prompt_tokens as u64);

    metrics::counter!(
        names::TOKENS_COMPLETION,
        labels::keys::PROFILE => profile_id.to_string()
    )
    .increment(usage.completion_tokens as u64);
}

/// Record a failed generation attempt
pub fn record_attempt_failure(
    profile_id: &str,
    intent: &str,
    kind: FailureKind,
    duration: Duration,
) {
    // Failures still count as attempts
    metrics::counter!(
        names::ATTEMPTS_TOTAL,
        labels::keys::PROFILE => profile_id.to_string(),
        labels::keys::INTENT => intent.to_string()
    )
    .increment(1);

    metrics::histogram!(
        names::ATTEMPT_DURATION,
        labels::keys::PROFILE => profile_id.to_string(),
        labels::keys::INTENT => intent.to_string()
    )
    .record(duration.as_secs_f64());

    metrics::counter!(
        names::FAILURES_TOTAL,
        labels::keys::PROFILE => profile_id.to_string(),
        labels::keys::FAILURE_KIND => labels::failure_kind_label(kind).to_string()
    )
    .increment(1);
}

/// Record a retry on the same profile
pub fn record_retry(profile_id: &str) {
    metrics::counter!(
        names::RETRIES_TOTAL,
        labels::keys::PROFILE => profile_id.to_string()
    )
    .increment(1);
}

/// Record an escalation away from a profile
pub fn record_escalation(from_profile_id: &str) {
    metrics::counter!(
        names::ESCALATIONS_TOTAL,
        labels::keys::PROFILE => from_profile_id.to_string()
    )
    .increment(1);
}

/// Record a task reaching a terminal state
pub fn record_task_finished(status: TaskStatus) {
    metrics::counter!(
        names::TASKS_TOTAL,
        labels::keys::STATUS => labels::status_label(status).to_string()
    )
    .increment(1);
}
