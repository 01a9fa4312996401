use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::FailureKind;
use crate::executor::wire::TokenUsage;

/// Terminal status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// A profile produced usable content
    Succeeded,
    /// Every profile in the fallback chain was tried and failed
    Exhausted,
    /// A non-retryable failure ended the task immediately
    Fatal,
}

/// Record of one generation call. Append-only: once pushed onto a
/// task's history it is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationAttempt {
    pub task_id: String,
    pub profile_id: String,
    /// 1-based attempt number across the whole task, all profiles.
    pub attempt: usize,
    pub success: bool,
    pub failure: Option<FailureKind>,
    pub detail: Option<String>,
    pub latency: Duration,
    pub usage: Option<TokenUsage>,
}

/// Final outcome of one task: terminal status plus the full attempt
/// history, so callers can tell "succeeded first try" from "succeeded
/// after escalation" without inspecting orchestrator internals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub task_id: String,
    pub status: TaskStatus,
    /// Generated content, present only when `status` is `Succeeded`.
    pub content: Option<String>,
    /// Profile that produced the content, or the last profile tried.
    pub profile_id: Option<String>,
    pub attempts: Vec<GenerationAttempt>,
    /// Wall time summed over all attempts.
    pub total_latency: Duration,
    /// Token usage summed over all attempts that reported it.
    pub usage: TokenUsage,
}

impl GenerationResult {
    pub fn succeeded(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Distinct profiles tried, in first-use order.
    pub fn profiles_tried(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for attempt in &self.attempts {
            if !seen.contains(&attempt.profile_id.as_str()) {
                seen.push(attempt.profile_id.as_str());
            }
        }
        seen
    }
}
