//! Error types for the Atelier generation orchestrator.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Backend failures are classified once, at the backend boundary, into
//! [`BackendErrorKind`]; everything above that layer works with the
//! classification and never sees transport errors.
//!
//! # Examples
//!
//! ```
//! use atelier_error::{AtelierResult, BackendError};
//!
//! fn call() -> AtelierResult<String> {
//!     Err(BackendError::from_status(503, "overloaded"))?
//! }
//!
//! assert!(call().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod generation;
mod rate_limit;

pub use backend::{BackendError, BackendErrorKind, RetryableError};
pub use config::ConfigError;
pub use error::{AtelierError, AtelierErrorKind, AtelierResult};
pub use generation::{AttemptFailure, FailureReason, GenerationError, GenerationErrorKind};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
