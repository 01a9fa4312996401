//! Tests for the failure taxonomy and its classification rules.

use relayllm::FailureKind;
use reqwest::StatusCode;

// ============================================================================
// Classification properties
// ============================================================================

#[test]
fn retryable_kinds() {
    assert!(FailureKind::RateLimit.is_retryable());
    assert!(FailureKind::TransientNetwork.is_retryable());
    assert!(!FailureKind::Auth.is_retryable());
    assert!(!FailureKind::QuotaExhausted.is_retryable());
    assert!(!FailureKind::Validation.is_retryable());
    assert!(!FailureKind::ContentPolicy.is_retryable());
}

#[test]
fn profile_exhausting_kinds() {
    assert!(FailureKind::Auth.exhausts_profile());
    assert!(FailureKind::QuotaExhausted.exhausts_profile());
    assert!(!FailureKind::RateLimit.exhausts_profile());
}

#[test]
fn fatal_kinds() {
    assert!(FailureKind::Validation.is_fatal());
    assert!(FailureKind::ContentPolicy.is_fatal());
    assert!(!FailureKind::RateLimit.is_fatal());
    assert!(!FailureKind::Auth.is_fatal());
}

#[test]
fn every_kind_has_exactly_one_disposition() {
    let kinds = [
        FailureKind::Auth,
        FailureKind::RateLimit,
        FailureKind::TransientNetwork,
        FailureKind::QuotaExhausted,
        FailureKind::Validation,
        FailureKind::ContentPolicy,
    ];
    for kind in kinds {
        let dispositions = [kind.is_retryable(), kind.exhausts_profile(), kind.is_fatal()];
        assert_eq!(
            dispositions.iter().filter(|d| **d).count(),
            1,
            "{} must map to exactly one disposition",
            kind
        );
    }
}

// ============================================================================
// HTTP response classification
// ============================================================================

#[test]
fn status_401_and_403_are_auth() {
    assert_eq!(
        FailureKind::from_response(StatusCode::UNAUTHORIZED, "invalid key"),
        FailureKind::Auth
    );
    assert_eq!(
        FailureKind::from_response(StatusCode::FORBIDDEN, "forbidden"),
        FailureKind::Auth
    );
}

#[test]
fn status_429_is_rate_limit() {
    assert_eq!(
        FailureKind::from_response(StatusCode::TOO_MANY_REQUESTS, ""),
        FailureKind::RateLimit
    );
}

#[test]
fn status_400_is_validation() {
    assert_eq!(
        FailureKind::from_response(StatusCode::BAD_REQUEST, "missing field 'messages'"),
        FailureKind::Validation
    );
}

#[test]
fn content_filter_body_wins_over_status() {
    // Azure reports refusals behind a 400.
    assert_eq!(
        FailureKind::from_response(
            StatusCode::BAD_REQUEST,
            "The response was filtered due to the prompt triggering the content management policy"
        ),
        FailureKind::ContentPolicy
    );
}

#[test]
fn quota_body_wins_over_status() {
    assert_eq!(
        FailureKind::from_response(StatusCode::TOO_MANY_REQUESTS, "insufficient_quota"),
        FailureKind::QuotaExhausted
    );
}

#[test]
fn throttle_keywords_classify_as_rate_limit() {
    assert_eq!(
        FailureKind::from_response(StatusCode::SERVICE_UNAVAILABLE, "model is overloaded"),
        FailureKind::RateLimit
    );
}

#[test]
fn unrecognized_server_errors_stay_transient() {
    assert_eq!(
        FailureKind::from_response(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
        FailureKind::TransientNetwork
    );
    assert_eq!(
        FailureKind::from_response(StatusCode::BAD_GATEWAY, ""),
        FailureKind::TransientNetwork
    );
}
