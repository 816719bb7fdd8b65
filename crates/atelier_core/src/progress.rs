//! Fire-and-forget progress reporting for UI layers.

use crate::AttemptState;
use std::time::Duration;
use tokio::sync::mpsc;

/// A progress notification emitted while a coordinator runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// An attempt was launched.
    AttemptStarted {
        /// Attempt index
        index: usize,
    },
    /// The rate limiter granted a backend call for an attempt.
    Admitted {
        /// Attempt index
        index: usize,
        /// Call number within the attempt, starting at zero
        call: u32,
    },
    /// A retryable failure occurred and the attempt will back off.
    Retrying {
        /// Attempt index
        index: usize,
        /// Call number that failed
        call: u32,
        /// Backoff before the next call
        delay: Duration,
        /// Classified failure that triggered the retry
        reason: String,
    },
    /// An attempt reached a terminal state.
    AttemptFinished {
        /// Attempt index
        index: usize,
        /// Terminal state
        state: AttemptState,
    },
}

/// Sending half handed to a coordinator.
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Optional progress sink that never blocks and ignores a closed receiver.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<ProgressSender>,
}

impl ProgressReporter {
    /// A reporter that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// A reporter forwarding to `tx`.
    pub fn new(tx: ProgressSender) -> Self {
        Self { tx: Some(tx) }
    }

    /// Create a reporter and the receiver that observes it.
    ///
    /// # Example
    ///
    /// ```
    /// use atelier_core::{ProgressEvent, ProgressReporter};
    ///
    /// let (reporter, mut rx) = ProgressReporter::channel();
    /// reporter.report(ProgressEvent::AttemptStarted { index: 0 });
    /// assert_eq!(rx.try_recv().unwrap(), ProgressEvent::AttemptStarted { index: 0 });
    /// ```
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Emit an event.
    pub fn report(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

impl From<ProgressSender> for ProgressReporter {
    fn from(tx: ProgressSender) -> Self {
        Self::new(tx)
    }
}
