//! Core types for the Atelier generation orchestrator.
//!
//! This crate holds the pieces shared by the rate limiter and the
//! coordinator: the [`Clock`] every wait goes through, cooperative
//! cancellation, rate budgets, retry policy, coordinator settings, attempt
//! lifecycle and progress events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attempt;
mod budget;
mod cancel;
mod clock;
mod coordinator;
mod progress;
mod retry;
mod telemetry;

pub use attempt::AttemptState;
pub use budget::{RateBudget, RateBudgetBuilder};
pub use cancel::{CancelHandle, CancelSignal};
pub use clock::{Clock, TokioClock};
pub use coordinator::{ConcurrencyMode, CoordinatorSettings};
pub use progress::{ProgressEvent, ProgressReporter, ProgressSender};
pub use retry::{RetryPolicy, RetrySchedule};
pub use telemetry::init_tracing;
#[cfg(feature = "otel")]
pub use telemetry::{init_telemetry, shutdown_telemetry};
