//! One generation attempt and its lifecycle.

use atelier_core::{AttemptState, CancelSignal, ProgressEvent, ProgressReporter};

/// One independent try at producing a result.
///
/// Owned by whoever drives it: the coordinator creates one per index and
/// hands it to the task running the backend call. Every state change is
/// checked against [`AttemptState::can_transition_to`], and reaching a
/// terminal state emits [`ProgressEvent::AttemptFinished`].
#[derive(Debug)]
pub struct Attempt {
    index: usize,
    estimated_tokens: u64,
    cancel: CancelSignal,
    progress: ProgressReporter,
    state: AttemptState,
}

impl Attempt {
    /// Create a pending attempt and announce it.
    pub fn new(
        index: usize,
        estimated_tokens: u64,
        cancel: CancelSignal,
        progress: ProgressReporter,
    ) -> Self {
        progress.report(ProgressEvent::AttemptStarted { index });
        Self {
            index,
            estimated_tokens,
            cancel,
            progress,
            state: AttemptState::Pending,
        }
    }

    /// A standalone attempt with no cancellation and no progress sink.
    pub fn detached(estimated_tokens: u64) -> Self {
        Self::new(
            0,
            estimated_tokens,
            CancelSignal::never(),
            ProgressReporter::disabled(),
        )
    }

    /// Attempt index, starting at zero.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Tokens charged to the rate limiter per backend call.
    pub fn estimated_tokens(&self) -> u64 {
        self.estimated_tokens
    }

    /// Cancellation signal observed at every suspension point.
    pub fn cancel(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Current state.
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Move to `next`. Illegal transitions are ignored and return false.
    pub fn advance(&mut self, next: AttemptState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                attempt = self.index,
                from = %self.state,
                to = %next,
                "Ignoring illegal attempt transition"
            );
            return false;
        }
        self.state = next;
        if next.is_terminal() {
            self.progress.report(ProgressEvent::AttemptFinished {
                index: self.index,
                state: next,
            });
        }
        true
    }

    /// Forward a progress event.
    pub(crate) fn report(&self, event: ProgressEvent) {
        self.progress.report(event);
    }
}
