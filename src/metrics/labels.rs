//! Label helpers for consistent metric labeling

use crate::errors::FailureKind;
use crate::orchestrator::types::TaskStatus;

/// Standard label keys
pub mod keys {
    /// Profile id label key
    pub const PROFILE: &str = "profile";
    /// Task intent label key
    pub const INTENT: &str = "intent";
    /// Failure kind label key
    pub const FAILURE_KIND: &str = "failure_kind";
    /// Terminal status label key
    pub const STATUS: &str = "status";
}

/// Convert FailureKind to a label value string
pub fn failure_kind_label(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Auth => "auth",
        FailureKind::RateLimit => "rate_limit",
        FailureKind::TransientNetwork => "transient_network",
        FailureKind::QuotaExhausted => "quota_exhausted",
        FailureKind::Validation => "validation",
        FailureKind::ContentPolicy => "content_policy",
    }
}

/// Convert TaskStatus to a label value string
pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Succeeded => "succeeded",
        TaskStatus::Exhausted => "exhausted",
        TaskStatus::Fatal => "fatal",
    }
}
