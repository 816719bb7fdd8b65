//! Sliding-window rate limiter with a concurrency ceiling.
//!
//! This module provides the [`RateLimiter`] struct which enforces a
//! [`RateBudget`] using:
//! - A sliding-window grant log for requests, tokens and minimum spacing
//! - A Tokio Semaphore for the in-flight ceiling
//!
//! The log lives behind a single mutex held only for the prune-and-check
//! step. Every wait happens outside the lock.

use crate::window::WindowState;
use atelier_core::{CancelSignal, Clock, RateBudget, TokioClock};
use atelier_error::{RateLimitError, RateLimitErrorKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, instrument, trace};

/// Point-in-time view of limiter usage, for progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct UsageSnapshot {
    /// Grants within the trailing window.
    requests_in_window: usize,
    /// Token estimates within the trailing window.
    tokens_in_window: u64,
    /// Admissions currently holding a concurrency slot.
    in_flight: usize,
}

enum Admission {
    Granted(RateLimiterGuard),
    WaitFor(Duration),
    WaitForSlot,
}

/// Process-wide admission control for backend calls.
///
/// One limiter is shared (behind an `Arc`) by every attempt of every
/// coordinator that talks to the same provider. There is no per-caller
/// identity and grants are not FIFO: whichever waiter re-evaluates first
/// after conditions clear proceeds.
///
/// # Example
///
/// ```
/// use atelier_core::RateBudget;
/// use atelier_rate_limit::RateLimiter;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = RateLimiter::new(RateBudget::default());
///
/// let guard = limiter.acquire(1_000).await?;
/// // Make the backend call...
/// drop(guard); // Releases the concurrency slot
///
/// assert_eq!(*limiter.snapshot().await.requests_in_window(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    budget: RateBudget,
    clock: Arc<dyn Clock>,
    state: Mutex<WindowState>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl RateLimiter {
    /// Create a limiter driven by the tokio clock.
    pub fn new(budget: RateBudget) -> Self {
        Self::with_clock(budget, Arc::new(TokioClock))
    }

    /// Create a limiter driven by `clock`.
    pub fn with_clock(budget: RateBudget, clock: Arc<dyn Clock>) -> Self {
        let concurrent_semaphore = Arc::new(Semaphore::new(*budget.max_concurrent() as usize));
        Self {
            budget,
            clock,
            state: Mutex::new(WindowState::default()),
            concurrent_semaphore,
        }
    }

    /// The budget this limiter enforces.
    pub fn budget(&self) -> &RateBudget {
        &self.budget
    }

    /// The clock this limiter reads and sleeps on.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Wait for admission of a call estimated at `estimated_tokens`.
    ///
    /// Returns a guard that holds one concurrency slot until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitErrorKind::EstimateExceedsBudget`] if the estimate
    /// alone exceeds the token budget, since such a call could never be
    /// admitted.
    pub async fn acquire(&self, estimated_tokens: u64) -> Result<RateLimiterGuard, RateLimitError> {
        self.acquire_cancellable(estimated_tokens, &CancelSignal::never())
            .await
    }

    /// Wait for admission unless `cancel` fires first.
    ///
    /// Cancellation is observed before every evaluation and during every
    /// wait. A cancelled caller never holds a slot or leaves a grant in the
    /// window.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitErrorKind::Cancelled`] on cancellation and
    /// [`RateLimitErrorKind::EstimateExceedsBudget`] for an estimate that can
    /// never fit.
    #[instrument(skip(self, cancel), fields(tokens = estimated_tokens))]
    pub async fn acquire_cancellable(
        &self,
        estimated_tokens: u64,
        cancel: &CancelSignal,
    ) -> Result<RateLimiterGuard, RateLimitError> {
        self.check_estimate(estimated_tokens)?;

        // A slot handed over by a release, carried into the next evaluation
        let mut slot = None;
        loop {
            if cancel.is_cancelled() {
                debug!("Admission abandoned on cancellation");
                return Err(RateLimitError::new(RateLimitErrorKind::Cancelled));
            }

            match self.evaluate(estimated_tokens, slot.take()).await {
                Admission::Granted(guard) => return Ok(guard),
                Admission::WaitFor(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "Window full, waiting");
                    if !cancel.sleep(self.clock.as_ref(), wait).await {
                        return Err(RateLimitError::new(RateLimitErrorKind::Cancelled));
                    }
                }
                Admission::WaitForSlot => {
                    debug!("All concurrency slots in use, waiting for a release");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            return Err(RateLimitError::new(RateLimitErrorKind::Cancelled));
                        }
                        permit = Arc::clone(&self.concurrent_semaphore).acquire_owned() => {
                            slot = permit.ok();
                        }
                    }
                }
            }
        }
    }

    /// Grant immediately if every condition holds, without waiting.
    ///
    /// Returns `None` if the call would have to wait, if the estimate can
    /// never fit, or if another task is evaluating at this moment.
    pub fn try_acquire(&self, estimated_tokens: u64) -> Option<RateLimiterGuard> {
        if !self.budget.admits_estimate(estimated_tokens) {
            return None;
        }
        let mut state = self.state.try_lock().ok()?;
        let now = self.clock.now();
        state.prune(now, *self.budget.window());
        if state.wait_for(now, estimated_tokens, &self.budget).is_some() {
            return None;
        }
        let permit = Arc::clone(&self.concurrent_semaphore)
            .try_acquire_owned()
            .ok()?;
        state.record(now, estimated_tokens);
        Some(RateLimiterGuard { _permit: permit })
    }

    /// Current usage over the trailing window.
    pub async fn snapshot(&self) -> UsageSnapshot {
        let mut state = self.state.lock().await;
        state.prune(self.clock.now(), *self.budget.window());
        UsageSnapshot {
            requests_in_window: state.requests(),
            tokens_in_window: state.tokens(),
            in_flight: *self.budget.max_concurrent() as usize
                - self.concurrent_semaphore.available_permits(),
        }
    }

    fn check_estimate(&self, estimated_tokens: u64) -> Result<(), RateLimitError> {
        if self.budget.admits_estimate(estimated_tokens) {
            Ok(())
        } else {
            Err(RateLimitError::new(
                RateLimitErrorKind::EstimateExceedsBudget {
                    estimated: estimated_tokens,
                    budget: *self.budget.max_tokens_per_window(),
                },
            ))
        }
    }

    /// One prune-and-check under the lock.
    ///
    /// A `held` slot is used in place of a fresh one; it is released again
    /// if the window still says wait.
    async fn evaluate(&self, estimated_tokens: u64, held: Option<OwnedSemaphorePermit>) -> Admission {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        state.prune(now, *self.budget.window());

        if let Some(wait) = state.wait_for(now, estimated_tokens, &self.budget) {
            return Admission::WaitFor(wait);
        }

        let permit = match held {
            Some(permit) => permit,
            None => match Arc::clone(&self.concurrent_semaphore).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => return Admission::WaitForSlot,
            },
        };

        state.record(now, estimated_tokens);
        trace!(
            requests = state.requests(),
            tokens = state.tokens(),
            "Admission granted"
        );
        Admission::Granted(RateLimiterGuard { _permit: permit })
    }
}

/// RAII guard for rate limiter.
///
/// Automatically releases the concurrency slot when dropped, on every exit
/// path including errors, panics and cancellation. The grant itself stays in
/// the window until it ages out.
#[derive(Debug)]
pub struct RateLimiterGuard {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiterGuard {
    /// Release the concurrency slot now.
    pub fn release(self) {
        drop(self);
    }
}
