//! Runs generation attempts and picks the first acceptable result.

use crate::{AcceptancePredicate, Attempt, GenerationRequest, RetryingClient};
use atelier_core::{
    AttemptState, CancelHandle, ConcurrencyMode, CoordinatorSettings, ProgressReporter,
};
use atelier_error::{
    AtelierResult, AttemptFailure, FailureReason, GenerationError, GenerationErrorKind,
};
use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

/// Counters describing how a run went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttemptStats {
    /// Attempts started
    pub launched: usize,
    /// Attempts whose text the predicate turned down
    pub rejected: usize,
    /// Attempts that ended in a backend or admission failure
    pub failed: usize,
    /// Attempts stopped or discarded once a winner was chosen
    pub cancelled: usize,
}

/// The accepted outcome of a coordinator run.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct GenerationResult {
    /// Winning text.
    text: String,
    /// Index of the winning attempt.
    index: usize,
    /// Time from the start of the run to acceptance.
    elapsed: Duration,
    /// Attempt counters at the moment of acceptance.
    stats: AttemptStats,
}

impl GenerationResult {
    /// Consume the result and return the winning text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Result of one attempt task.
type AttemptOutcome = (Attempt, AtelierResult<String>);

/// Cancels every attempt of a run when the run ends, however it ends.
struct CancelOnDrop(CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Decides how many independent attempts to launch and when to stop.
///
/// The coordinator never retries a backend call itself; that is the
/// [`RetryingClient`]'s job.
#[derive(Debug, Clone)]
pub struct Coordinator {
    client: RetryingClient,
    settings: CoordinatorSettings,
    progress: ProgressReporter,
}

impl Coordinator {
    /// Create a coordinator around `client`.
    pub fn new(client: RetryingClient, settings: CoordinatorSettings) -> Self {
        Self {
            client,
            settings,
            progress: ProgressReporter::disabled(),
        }
    }

    /// Send progress events to `progress`.
    pub fn with_progress(mut self, progress: impl Into<ProgressReporter>) -> Self {
        self.progress = progress.into();
        self
    }

    /// The wrapped client.
    pub fn client(&self) -> &RetryingClient {
        &self.client
    }

    /// The coordinator settings.
    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Run `request`, returning the first result `predicate` accepts.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationErrorKind::AllAttemptsFailed`] with one record per
    /// attempt when no attempt produced an acceptable result.
    #[tracing::instrument(
        skip(self, request, predicate),
        fields(
            attempts = request.attempt_count(),
            mode = %request.mode(),
            tokens = request.estimated_tokens()
        )
    )]
    pub async fn run<P>(
        &self,
        request: &GenerationRequest,
        predicate: &P,
    ) -> AtelierResult<GenerationResult>
    where
        P: AcceptancePredicate + ?Sized,
    {
        tracing::info!("Starting generation run");
        let result = match request.mode() {
            ConcurrencyMode::Sequential => self.run_sequential(request, predicate).await,
            ConcurrencyMode::Concurrent => self.run_concurrent(request, predicate).await,
        };
        match &result {
            Ok(winner) => tracing::info!(
                winner = winner.index,
                elapsed_ms = winner.elapsed.as_millis() as u64,
                launched = winner.stats.launched,
                "Generation accepted"
            ),
            Err(e) => tracing::warn!(error = %e, "Generation failed"),
        }
        result
    }

    async fn run_sequential<P>(
        &self,
        request: &GenerationRequest,
        predicate: &P,
    ) -> AtelierResult<GenerationResult>
    where
        P: AcceptancePredicate + ?Sized,
    {
        let clock = Arc::clone(self.client.limiter().clock());
        let start = clock.now();
        let cancel = CancelOnDrop(CancelHandle::new());
        let attempt_count = *request.attempt_count();

        let mut stats = AttemptStats::default();
        let mut failures = Vec::with_capacity(attempt_count);

        for index in 0..attempt_count {
            let mut attempt = Attempt::new(
                index,
                *request.estimated_tokens(),
                cancel.0.signal(),
                self.progress.clone(),
            );
            stats.launched += 1;
            let result = self.client.call_for(request.prompt(), &mut attempt).await;

            match judge(attempt, result, predicate, &mut stats) {
                Ok(text) => {
                    return Ok(GenerationResult {
                        text,
                        index,
                        elapsed: clock.now() - start,
                        stats,
                    });
                }
                Err(failure) => failures.push(failure),
            }

            if index + 1 < attempt_count {
                let delay = *self.settings.inter_attempt_delay();
                tracing::debug!(
                    attempt = index,
                    delay_ms = delay.as_millis() as u64,
                    "Pausing before next attempt"
                );
                clock.sleep(delay).await;
            }
        }

        Err(all_failed(failures))
    }

    async fn run_concurrent<P>(
        &self,
        request: &GenerationRequest,
        predicate: &P,
    ) -> AtelierResult<GenerationResult>
    where
        P: AcceptancePredicate + ?Sized,
    {
        let clock = Arc::clone(self.client.limiter().clock());
        let start = clock.now();
        let cancel = CancelOnDrop(CancelHandle::new());
        let attempt_count = *request.attempt_count();
        let cap = *self.settings.concurrency();
        let prompt: Arc<str> = Arc::from(request.prompt().as_str());

        let mut stats = AttemptStats::default();
        let mut failures = Vec::with_capacity(attempt_count);
        let mut in_flight = FuturesUnordered::new();
        let mut next = 0;

        loop {
            while next < attempt_count && in_flight.len() < cap {
                let attempt = Attempt::new(
                    next,
                    *request.estimated_tokens(),
                    cancel.0.signal(),
                    self.progress.clone(),
                );
                in_flight.push(self.launch(Arc::clone(&prompt), attempt));
                stats.launched += 1;
                next += 1;
            }

            let Some(first) = in_flight.next().await else {
                break;
            };

            // Everything finished in the same tick competes on index
            let mut ready = vec![first];
            while let Some(Some(joined)) = in_flight.next().now_or_never() {
                ready.push(joined);
            }
            ready.sort_by_key(|(index, _)| *index);

            let mut winner = None;
            for (index, joined) in ready {
                let (mut attempt, result) = match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(attempt = index, error = %e, "Attempt task failed");
                        stats.failed += 1;
                        failures.push(AttemptFailure::new(
                            index,
                            FailureReason::Fatal(format!("attempt task failed: {}", e)),
                        ));
                        continue;
                    }
                };

                if winner.is_some() {
                    tracing::debug!(attempt = index, "Discarding result after a winner was chosen");
                    attempt.advance(AttemptState::Cancelled);
                    stats.cancelled += 1;
                    continue;
                }

                match judge(attempt, result, predicate, &mut stats) {
                    Ok(text) => winner = Some((index, text)),
                    Err(failure) => failures.push(failure),
                }
            }

            if let Some((index, text)) = winner {
                cancel.0.cancel();
                stats.cancelled += in_flight.len();
                tracing::debug!(
                    attempt = index,
                    cancelled = in_flight.len(),
                    never_launched = attempt_count - next,
                    "Cancelling remaining attempts"
                );
                return Ok(GenerationResult {
                    text,
                    index,
                    elapsed: clock.now() - start,
                    stats,
                });
            }
        }

        failures.sort_by_key(|failure| failure.index);
        Err(all_failed(failures))
    }

    /// Spawn one attempt.
    ///
    /// Tasks are never aborted: a cancelled attempt stops at its next
    /// suspension point, dropping any rate limiter slot it holds.
    fn launch(
        &self,
        prompt: Arc<str>,
        mut attempt: Attempt,
    ) -> impl Future<Output = (usize, Result<AttemptOutcome, JoinError>)> {
        let index = attempt.index();
        let client = self.client.clone();
        let handle = tokio::spawn(async move {
            let result = client.call_for(&prompt, &mut attempt).await;
            if attempt.cancel().is_cancelled() {
                // A winner exists, so nobody is left to judge this outcome
                attempt.advance(AttemptState::Cancelled);
            }
            (attempt, result)
        });
        async move { (index, handle.await) }
    }
}

/// Apply the predicate to one finished attempt and record its terminal state.
fn judge<P>(
    mut attempt: Attempt,
    result: AtelierResult<String>,
    predicate: &P,
    stats: &mut AttemptStats,
) -> Result<String, AttemptFailure>
where
    P: AcceptancePredicate + ?Sized,
{
    let index = attempt.index();
    match result {
        Ok(text) if predicate.accepts(&text) => {
            attempt.advance(AttemptState::Accepted);
            Ok(text)
        }
        Ok(text) => {
            tracing::warn!(
                attempt = index,
                chars = text.chars().count(),
                "Result rejected by predicate"
            );
            attempt.advance(AttemptState::Rejected);
            stats.rejected += 1;
            Err(AttemptFailure::new(index, FailureReason::Rejected { text }))
        }
        Err(e) => {
            let reason = e.failure_reason();
            if reason == FailureReason::Cancelled {
                attempt.advance(AttemptState::Cancelled);
                stats.cancelled += 1;
            } else {
                tracing::warn!(attempt = index, reason = %reason, "Attempt failed");
                attempt.advance(AttemptState::Failed);
                stats.failed += 1;
            }
            Err(AttemptFailure::new(index, reason))
        }
    }
}

fn all_failed(failures: Vec<AttemptFailure>) -> atelier_error::AtelierError {
    GenerationError::new(GenerationErrorKind::AllAttemptsFailed { failures }).into()
}
