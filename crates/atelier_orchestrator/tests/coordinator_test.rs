//! Tests for sequential and concurrent coordinator runs.

mod test_utils;

use atelier_core::{
    AttemptState, ConcurrencyMode, CoordinatorSettings, ProgressEvent, ProgressReporter,
    RateBudget, RetryPolicy,
};
use atelier_error::{AtelierError, AtelierErrorKind, FailureReason, GenerationError, GenerationErrorKind};
use atelier_orchestrator::{
    AttemptStats, Coordinator, GenerationRequest, LengthRange, RetryingClient,
};
use atelier_rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{MockBackend, MockResponse, RecordingClock, open_budget};
use tokio::time::Instant;

struct Harness {
    coordinator: Coordinator,
    clock: Arc<RecordingClock>,
    limiter: Arc<RateLimiter>,
}

fn harness(backend: &Arc<MockBackend>, budget: RateBudget, settings: CoordinatorSettings) -> Harness {
    let clock = Arc::new(RecordingClock::default());
    let limiter = Arc::new(RateLimiter::with_clock(budget, clock.clone()));
    let client = RetryingClient::new(backend.clone(), Arc::clone(&limiter), RetryPolicy::default());
    Harness {
        coordinator: Coordinator::new(client, settings),
        clock,
        limiter,
    }
}

fn request(attempts: usize, mode: ConcurrencyMode) -> GenerationRequest {
    GenerationRequest::builder()
        .prompt("Write a short story")
        .attempt_count(attempts)
        .mode(mode)
        .build()
        .unwrap()
}

fn generation_error(err: &AtelierError) -> &GenerationError {
    match err.kind() {
        AtelierErrorKind::Generation(e) => e,
        other => panic!("expected generation error, got {}", other),
    }
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Sequential
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_sequential_accepts_second_attempt_after_delay() {
    let backend = Arc::new(MockBackend::new(vec![
        MockResponse::text("too short"),
        MockResponse::text("exactly long enough"),
    ]));
    let h = harness(&backend, open_budget(), CoordinatorSettings::default());
    let range = LengthRange::new(15, 25).unwrap();

    let result = h
        .coordinator
        .run(&request(3, ConcurrencyMode::Sequential), &range)
        .await
        .unwrap();

    assert_eq!(*result.index(), 1);
    assert_eq!(result.text(), "exactly long enough");
    assert_eq!(*result.elapsed(), Duration::from_secs(2));
    assert_eq!(
        *result.stats(),
        AttemptStats {
            launched: 2,
            rejected: 1,
            failed: 0,
            cancelled: 0,
        }
    );
    assert_eq!(h.clock.sleeps(), vec![Duration::from_secs(2)]);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_exhaustion_keeps_rejected_texts() {
    let backend = Arc::new(MockBackend::new(vec![
        MockResponse::text("a"),
        MockResponse::text("bb"),
        MockResponse::text("ccc"),
    ]));
    let h = harness(&backend, open_budget(), CoordinatorSettings::default());

    let err = h
        .coordinator
        .run(&request(3, ConcurrencyMode::Sequential), &|text: &str| {
            text.len() > 10
        })
        .await
        .unwrap_err();

    let err = generation_error(&err);
    assert_eq!(err.failures().len(), 3);
    assert_eq!(err.rejected_texts().collect::<Vec<_>>(), vec!["a", "bb", "ccc"]);
    // No pause after the final attempt
    assert_eq!(h.clock.sleeps(), vec![Duration::from_secs(2); 2]);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_moves_on_after_fatal_attempt() {
    let backend = Arc::new(MockBackend::new(vec![
        MockResponse::fatal(),
        MockResponse::text("recovered"),
    ]));
    let h = harness(&backend, open_budget(), CoordinatorSettings::default());

    let result = h
        .coordinator
        .run(&request(2, ConcurrencyMode::Sequential), &|_: &str| true)
        .await
        .unwrap();

    assert_eq!(*result.index(), 1);
    assert_eq!(result.stats().failed, 1);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_progress_events() {
    let backend = Arc::new(MockBackend::new(vec![
        MockResponse::text("no"),
        MockResponse::text("yes please"),
    ]));
    let h = harness(&backend, open_budget(), CoordinatorSettings::default());
    let (progress, mut rx) = ProgressReporter::channel();
    let coordinator = h.coordinator.with_progress(progress);

    coordinator
        .run(&request(2, ConcurrencyMode::Sequential), &|text: &str| {
            text.starts_with("yes")
        })
        .await
        .unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![
            ProgressEvent::AttemptStarted { index: 0 },
            ProgressEvent::Admitted { index: 0, call: 0 },
            ProgressEvent::AttemptFinished {
                index: 0,
                state: AttemptState::Rejected,
            },
            ProgressEvent::AttemptStarted { index: 1 },
            ProgressEvent::Admitted { index: 1, call: 0 },
            ProgressEvent::AttemptFinished {
                index: 1,
                state: AttemptState::Accepted,
            },
        ]
    );
}

// ============================================================================
// Concurrent
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_winner_cancels_in_flight_and_skips_unlaunched() {
    // Calls arrive in launch order: attempts 0 and 1, then 2 once 0 finishes
    let backend = Arc::new(MockBackend::new(vec![
        MockResponse::text_after("rejected", Duration::from_secs(1)),
        MockResponse::text_after("accepted but slow", Duration::from_secs(10)),
        MockResponse::text_after("accepted", Duration::from_secs(1)),
    ]));
    let settings = CoordinatorSettings::new(2, Duration::ZERO).unwrap();
    let h = harness(&backend, open_budget(), settings);

    let result = h
        .coordinator
        .run(&request(4, ConcurrencyMode::Concurrent), &|text: &str| {
            text.starts_with("accepted")
        })
        .await
        .unwrap();

    assert_eq!(*result.index(), 2);
    assert_eq!(result.text(), "accepted");
    assert_eq!(*result.elapsed(), Duration::from_secs(2));
    assert_eq!(
        *result.stats(),
        AttemptStats {
            launched: 3,
            rejected: 1,
            failed: 0,
            cancelled: 1,
        }
    );
    assert_eq!(backend.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_tie_goes_to_lowest_index() {
    let backend = Arc::new(MockBackend::repeating(MockResponse::text_after(
        "accepted",
        Duration::from_secs(1),
    )));
    let settings = CoordinatorSettings::new(3, Duration::ZERO).unwrap();
    let h = harness(&backend, open_budget(), settings);

    let result = h
        .coordinator
        .run(&request(3, ConcurrencyMode::Concurrent), &|_: &str| true)
        .await
        .unwrap();

    assert_eq!(*result.index(), 0);
    assert_eq!(result.stats().launched, 3);
    assert_eq!(result.stats().cancelled, 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_all_fatal_reports_every_attempt_in_order() {
    let backend = Arc::new(MockBackend::repeating(MockResponse::fatal()));
    let settings = CoordinatorSettings::new(3, Duration::ZERO).unwrap();
    let h = harness(&backend, open_budget(), settings);

    let err = h
        .coordinator
        .run(&request(3, ConcurrencyMode::Concurrent), &|_: &str| true)
        .await
        .unwrap_err();

    let err = generation_error(&err);
    assert!(matches!(err.kind, GenerationErrorKind::AllAttemptsFailed { .. }));
    let indices: Vec<_> = err.failures().iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(
        err.failures()
            .iter()
            .all(|f| matches!(f.reason, FailureReason::Fatal(_)))
    );
    // Fatal errors are never retried
    assert_eq!(backend.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_fatal_does_not_cancel_sibling() {
    let backend = Arc::new(MockBackend::new(vec![
        MockResponse::fatal(),
        MockResponse::text_after("ok", Duration::from_secs(3)),
    ]));
    let settings = CoordinatorSettings::new(2, Duration::ZERO).unwrap();
    let h = harness(&backend, open_budget(), settings);

    let result = h
        .coordinator
        .run(&request(2, ConcurrencyMode::Concurrent), &|_: &str| true)
        .await
        .unwrap();

    assert_eq!(*result.index(), 1);
    assert_eq!(result.text(), "ok");
    assert_eq!(*result.elapsed(), Duration::from_secs(3));
    assert_eq!(
        *result.stats(),
        AttemptStats {
            launched: 2,
            rejected: 0,
            failed: 1,
            cancelled: 0,
        }
    );
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_never_exceeds_attempt_cap() {
    let backend = Arc::new(MockBackend::repeating(MockResponse::text_after(
        "nope",
        Duration::from_secs(1),
    )));
    let settings = CoordinatorSettings::new(2, Duration::ZERO).unwrap();
    let h = harness(&backend, open_budget(), settings);
    let start = Instant::now();

    let err = h
        .coordinator
        .run(&request(5, ConcurrencyMode::Concurrent), &|_: &str| false)
        .await
        .unwrap_err();

    // Five one-second attempts, two at a time
    assert_eq!(Instant::now() - start, Duration::from_secs(3));
    assert_eq!(generation_error(&err).rejected_texts().count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_loser_leaves_no_grant_behind() {
    let budget = RateBudget::builder()
        .max_requests_per_window(1)
        .max_tokens_per_window(1_000_000)
        .window(Duration::from_secs(60))
        .min_interval(Duration::ZERO)
        .max_concurrent(2)
        .build()
        .unwrap();
    let backend = Arc::new(MockBackend::repeating(MockResponse::text_after(
        "accepted",
        Duration::from_secs(1),
    )));
    let settings = CoordinatorSettings::new(2, Duration::ZERO).unwrap();
    let h = harness(&backend, budget, settings);
    let (progress, mut rx) = ProgressReporter::channel();
    let coordinator = h.coordinator.with_progress(progress);

    let result = coordinator
        .run(&request(2, ConcurrencyMode::Concurrent), &|_: &str| true)
        .await
        .unwrap();
    assert_eq!(*result.index(), 0);
    assert_eq!(result.stats().cancelled, 1);

    // Let the loser observe cancellation in its window wait
    tokio::time::sleep(Duration::from_millis(1)).await;

    let usage = h.limiter.snapshot().await;
    assert_eq!(*usage.requests_in_window(), 1);
    assert_eq!(*usage.in_flight(), 0);
    assert_eq!(backend.calls(), 1);
    assert!(drain(&mut rx).contains(&ProgressEvent::AttemptFinished {
        index: 1,
        state: AttemptState::Cancelled,
    }));
}

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_request_validation() {
    let err = GenerationRequest::builder()
        .prompt("story")
        .attempt_count(0_usize)
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, GenerationErrorKind::InvalidRequest(_)));

    let err = GenerationRequest::builder().build().unwrap_err();
    assert!(matches!(err.kind, GenerationErrorKind::InvalidRequest(_)));
}
