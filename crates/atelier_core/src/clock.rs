//! Time source and suspension primitive.
//!
//! Every wait in the orchestrator (admission, backoff, inter-attempt delay)
//! goes through a [`Clock`], so window arithmetic can be driven by a paused
//! tokio runtime or by a custom implementation in tests.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Supplies the current time and a way to suspend the calling task.
///
/// Implementations must never block the OS thread: `sleep` is a suspension
/// point that yields to other tasks.
///
/// Backend call timeouts do not go through a `Clock`; they always use the
/// tokio timer.
///
/// # Example
///
/// ```
/// use atelier_core::{Clock, TokioClock};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let clock = TokioClock;
/// let start = clock.now();
/// clock.sleep(Duration::from_millis(1)).await;
/// assert!(clock.now() >= start);
/// # }
/// ```
#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer.
///
/// Honors `tokio::time::pause`, which makes it deterministic under
/// `#[tokio::test(start_paused = true)]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
