//! Cooperative cancellation shared between a coordinator and its attempts.

use crate::Clock;
use std::time::Duration;
use tokio::sync::watch;

/// Owning side of a cancellation signal.
///
/// Cancelling is idempotent and sticky: once set, every [`CancelSignal`]
/// derived from this handle reports cancelled forever.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Create a handle in the not-cancelled state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Derive a signal that observes this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Request cancellation of every attempt observing this handle.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observing side of a cancellation signal, checked at suspension points.
///
/// # Example
///
/// ```
/// use atelier_core::CancelHandle;
///
/// let handle = CancelHandle::new();
/// let signal = handle.signal();
/// assert!(!signal.is_cancelled());
/// handle.cancel();
/// assert!(signal.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that is never cancelled.
    pub fn never() -> Self {
        CancelHandle::new().signal()
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// Pends forever if the owning handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep on `clock` unless cancellation arrives first.
    ///
    /// Returns `false` if the sleep was cut short by cancellation, including
    /// when the signal was already cancelled on entry.
    pub async fn sleep(&self, clock: &dyn Clock, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => false,
            _ = clock.sleep(duration) => true,
        }
    }
}
