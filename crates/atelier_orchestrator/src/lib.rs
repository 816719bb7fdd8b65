//! Generation orchestration for Atelier.
//!
//! Two layers sit on top of the rate limiter:
//!
//! - [`RetryingClient`] wraps one [`GenerationBackend`](atelier_interface::GenerationBackend),
//!   going through the limiter before every call and retrying quota and
//!   transient failures on a backoff schedule.
//! - [`Coordinator`] runs a number of independent attempts, sequentially or
//!   under a concurrency cap, and returns the first result the acceptance
//!   predicate accepts. Once a winner is chosen the remaining attempts are
//!   cancelled at their next suspension point.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use atelier_core::{ConcurrencyMode, CoordinatorSettings, RateBudget, RetryPolicy};
//! use atelier_error::BackendError;
//! use atelier_interface::GenerationBackend;
//! use atelier_orchestrator::{Coordinator, GenerationRequest, LengthRange, RetryingClient};
//! use atelier_rate_limit::RateLimiter;
//! use std::sync::Arc;
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl GenerationBackend for Canned {
//!     async fn invoke(&self, _prompt: &str, _max_tokens: u32) -> Result<String, BackendError> {
//!         Ok("The keeper lit the lamp.".to_string())
//!     }
//!
//!     fn provider_name(&self) -> &str {
//!         "canned"
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let limiter = Arc::new(RateLimiter::new(RateBudget::default()));
//! let client = RetryingClient::new(Arc::new(Canned), limiter, RetryPolicy::default());
//! let coordinator = Coordinator::new(client, CoordinatorSettings::default());
//!
//! let request = GenerationRequest::builder()
//!     .prompt("Write one sentence about a lighthouse")
//!     .attempt_count(3_usize)
//!     .mode(ConcurrencyMode::Concurrent)
//!     .build()?;
//! let range = LengthRange::new(10, 40)?;
//!
//! let result = coordinator.run(&request, &range).await?;
//! assert_eq!(result.text(), "The keeper lit the lamp.");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attempt;
mod client;
mod coordinator;
mod predicate;
mod request;

pub use attempt::Attempt;
pub use client::{DEFAULT_MAX_TOKENS, RetryingClient};
pub use coordinator::{AttemptStats, Coordinator, GenerationResult};
pub use predicate::{AcceptancePredicate, LengthRange};
pub use request::{GenerationRequest, GenerationRequestBuilder};
