//! Tests for backend failure classification.

use atelier_error::{
    AtelierError, AtelierErrorKind, AttemptFailure, BackendError, BackendErrorKind,
    FailureReason, GenerationError, GenerationErrorKind, RateLimitErrorKind, RetryableError,
};
use std::time::Duration;

#[test]
fn test_status_classification() {
    assert!(matches!(
        BackendErrorKind::from_status(429, "Too many requests"),
        BackendErrorKind::QuotaExceeded(_)
    ));

    for status in [408, 500, 502, 503, 504] {
        let kind = BackendErrorKind::from_status(status, "server trouble");
        assert!(
            matches!(kind, BackendErrorKind::Transient(_)),
            "{} should be transient",
            status
        );
        assert!(kind.is_retryable());
    }

    for status in [400, 401, 403, 404, 422] {
        let kind = BackendErrorKind::from_status(status, "client trouble");
        assert!(
            matches!(kind, BackendErrorKind::Fatal(_)),
            "{} should be fatal",
            status
        );
        assert!(!kind.is_retryable());
    }
}

#[test]
fn test_timeout_is_retryable() {
    let err = BackendError::new(BackendErrorKind::Timeout(Duration::from_secs(30)));
    assert!(err.is_retryable());
    assert_eq!(
        FailureReason::from(err.kind.clone()),
        FailureReason::Transient("timed out after 30s".to_string())
    );
}

#[test]
fn test_error_records_location() {
    let err = BackendError::quota("slow down");
    assert!(err.file.ends_with("classification_test.rs"));
    assert!(err.line > 0);
}

#[test]
fn test_rate_limit_kinds_map_to_failure_reasons() {
    assert_eq!(
        FailureReason::from(RateLimitErrorKind::Cancelled),
        FailureReason::Cancelled
    );
    let reason = FailureReason::from(RateLimitErrorKind::EstimateExceedsBudget {
        estimated: 9000,
        budget: 7500,
    });
    assert!(matches!(reason, FailureReason::OverBudget(msg) if msg.contains("9000")));
}

#[test]
fn test_all_attempts_failed_keeps_rejected_texts() {
    let err = GenerationError::new(GenerationErrorKind::AllAttemptsFailed {
        failures: vec![
            AttemptFailure::new(0, FailureReason::Rejected { text: "too short".into() }),
            AttemptFailure::new(1, BackendErrorKind::Fatal("policy".into())),
        ],
    });

    assert_eq!(err.failures().len(), 2);
    assert_eq!(err.rejected_texts().collect::<Vec<_>>(), vec!["too short"]);
    assert!(err.failures()[0].reason.is_rejection());
    assert_eq!(
        err.failures()[0].to_string(),
        "attempt 0: rejected by predicate (9 chars)"
    );
}

#[test]
fn test_top_level_wrapper() {
    let err: AtelierError = BackendError::fatal("bad key").into();
    assert!(matches!(err.kind(), AtelierErrorKind::Backend(_)));
    assert!(format!("{}", err).starts_with("Atelier Error: Backend Error"));
}

#[test]
fn test_wrapped_errors_keep_classification() {
    let quota: AtelierError = BackendError::quota("slow down").into();
    assert!(quota.is_retryable());
    assert!(matches!(quota.failure_reason(), FailureReason::QuotaExceeded(_)));

    let timeout: AtelierError = BackendError::new(BackendErrorKind::Timeout(Duration::from_secs(1))).into();
    assert!(matches!(timeout.failure_reason(), FailureReason::Transient(_)));

    let cancelled: AtelierError =
        atelier_error::RateLimitError::new(RateLimitErrorKind::Cancelled).into();
    assert!(!cancelled.is_retryable());
    assert_eq!(cancelled.failure_reason(), FailureReason::Cancelled);
}
