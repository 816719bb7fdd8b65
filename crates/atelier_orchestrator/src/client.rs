//! Rate-limited, retrying wrapper around a generation backend.

use crate::Attempt;
use atelier_core::{AttemptState, ProgressEvent, RetryPolicy};
use atelier_error::{
    AtelierResult, BackendError, BackendErrorKind, RateLimitError, RateLimitErrorKind,
    RetryableError,
};
use atelier_interface::GenerationBackend;
use atelier_rate_limit::RateLimiter;
use std::sync::Arc;

/// Default cap on generated tokens per backend call.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Wraps one backend with admission control and retries.
///
/// Every backend call, retries included, is a fresh admission from the
/// shared [`RateLimiter`]. The concurrency slot is released as soon as the
/// call returns, before any backoff sleep.
///
/// Backoff sleeps go through the limiter's clock. The per-call timeout of
/// the [`RetryPolicy`] is measured on tokio time regardless of that clock.
///
/// Cheap to clone: the backend and limiter are shared.
#[derive(Clone)]
pub struct RetryingClient {
    backend: Arc<dyn GenerationBackend>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    max_tokens: u32,
}

impl std::fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("provider", &self.backend.provider_name())
            .field("policy", &self.policy)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl RetryingClient {
    /// Create a client for `backend` sharing `limiter`.
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            limiter,
            policy,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the cap on generated tokens passed to the backend.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The shared limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// The retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call the backend once on behalf of no particular attempt.
    ///
    /// # Errors
    ///
    /// Returns the last classified backend error once retries are exhausted,
    /// a fatal error immediately, or a rate limit error if the estimate can
    /// never be admitted.
    pub async fn call(&self, prompt: &str, estimated_tokens: u64) -> AtelierResult<String> {
        let mut attempt = Attempt::detached(estimated_tokens);
        self.call_for(prompt, &mut attempt).await
    }

    /// Call the backend on behalf of `attempt`, retrying retryable failures.
    ///
    /// Moves the attempt through `Admitted` and `AwaitingResult` for every
    /// call; the caller decides the terminal state. Cancellation is observed
    /// before each admission and during each backoff sleep. A result already
    /// in hand is returned even if cancellation arrived during the call.
    ///
    /// # Errors
    ///
    /// As [`call`](Self::call), plus [`RateLimitErrorKind::Cancelled`] when
    /// the attempt is cancelled while suspended.
    #[tracing::instrument(
        skip(self, prompt, attempt),
        fields(
            provider = self.backend.provider_name(),
            attempt = attempt.index(),
            tokens = attempt.estimated_tokens()
        )
    )]
    pub async fn call_for(&self, prompt: &str, attempt: &mut Attempt) -> AtelierResult<String> {
        let index = attempt.index();
        let max_calls = *self.policy.max_retries();
        let clock = Arc::clone(self.limiter.clock());

        let mut call = 0;
        loop {
            let guard = self
                .limiter
                .acquire_cancellable(attempt.estimated_tokens(), attempt.cancel())
                .await?;
            attempt.advance(AttemptState::Admitted);
            attempt.report(ProgressEvent::Admitted { index, call });

            attempt.advance(AttemptState::AwaitingResult);
            let outcome = self.invoke(prompt).await;
            drop(guard);

            let error = match outcome {
                Ok(text) => {
                    tracing::debug!(call, chars = text.chars().count(), "Backend call succeeded");
                    return Ok(text);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                tracing::error!(call, error = %error.kind(), "Fatal backend failure, not retrying");
                return Err(error.into());
            }

            if call + 1 >= max_calls {
                tracing::warn!(
                    calls = call + 1,
                    error = %error.kind(),
                    "Retries exhausted"
                );
                return Err(error.into());
            }

            let delay = self.policy.schedule().delay_for(call as usize);
            tracing::warn!(
                call,
                delay_ms = delay.as_millis() as u64,
                error = %error.kind(),
                "Retryable backend failure, backing off"
            );
            attempt.report(ProgressEvent::Retrying {
                index,
                call,
                delay,
                reason: error.kind().to_string(),
            });

            if !attempt.cancel().sleep(clock.as_ref(), delay).await {
                tracing::debug!(call, "Cancelled during backoff");
                return Err(RateLimitError::new(RateLimitErrorKind::Cancelled).into());
            }
            call += 1;
        }
    }

    /// One backend call bounded by the policy's timeout.
    ///
    /// The timeout always runs on the tokio timer, not on the limiter's
    /// [`Clock`](atelier_core::Clock).
    async fn invoke(&self, prompt: &str) -> Result<String, BackendError> {
        let call = self.backend.invoke(prompt, self.max_tokens);
        match self.policy.call_timeout() {
            Some(limit) => match tokio::time::timeout(*limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(BackendError::new(BackendErrorKind::Timeout(*limit))),
            },
            None => call.await,
        }
    }
}
