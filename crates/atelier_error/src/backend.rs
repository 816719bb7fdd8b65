//! Classified backend call failures and retry classification.

use std::time::Duration;

/// Classified outcome of a failed backend call.
///
/// Backends report every failure through one of these kinds so that the
/// retrying client never has to inspect transport-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BackendErrorKind {
    /// The provider signalled throttling (HTTP 429 or equivalent)
    #[display("Quota exceeded: {}", _0)]
    QuotaExceeded(String),
    /// Connectivity or server-side failure that may succeed on retry
    #[display("Transient failure: {}", _0)]
    Transient(String),
    /// The call did not complete within the caller-supplied timeout
    #[display("Call timed out after {:?}", _0)]
    Timeout(Duration),
    /// Malformed request, authentication failure or policy rejection
    #[display("Fatal failure: {}", _0)]
    Fatal(String),
}

impl BackendErrorKind {
    /// Check if this failure should trigger another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendErrorKind::QuotaExceeded(_) => true,
            BackendErrorKind::Transient(_) => true,
            BackendErrorKind::Timeout(_) => true,
            BackendErrorKind::Fatal(_) => false,
        }
    }

    /// Classify an HTTP-equivalent status code.
    ///
    /// 429 is a quota signal; 408 and the 5xx gateway family are transient;
    /// every other status is fatal.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_error::BackendErrorKind;
    ///
    /// assert!(matches!(
    ///     BackendErrorKind::from_status(429, "slow down"),
    ///     BackendErrorKind::QuotaExceeded(_)
    /// ));
    /// assert!(!BackendErrorKind::from_status(401, "bad key").is_retryable());
    /// ```
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = format!("HTTP {}: {}", status_code, message.into());
        match status_code {
            429 => BackendErrorKind::QuotaExceeded(message),
            408 | 500 | 502 | 503 | 504 => BackendErrorKind::Transient(message),
            _ => BackendErrorKind::Fatal(message),
        }
    }
}

/// Backend error with source location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{BackendError, BackendErrorKind, RetryableError};
///
/// let err = BackendError::new(BackendErrorKind::Transient("connection reset".into()));
/// assert!(err.is_retryable());
/// assert!(format!("{}", err).contains("connection reset"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Backend Error: {} at line {} in {}", kind, line, file)]
pub struct BackendError {
    /// The classified failure
    pub kind: BackendErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl BackendError {
    /// Create a new BackendError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BackendErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a quota failure.
    #[track_caller]
    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::QuotaExceeded(message.into()))
    }

    /// Shorthand for a transient failure.
    #[track_caller]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transient(message.into()))
    }

    /// Shorthand for a fatal failure.
    #[track_caller]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Fatal(message.into()))
    }

    /// Build an error from an HTTP-equivalent status code.
    #[track_caller]
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::from_status(status_code, message))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BackendErrorKind {
        &self.kind
    }
}

/// Trait for errors that can drive a retry loop.
///
/// Quota and transient failures return true; anything that will fail the
/// same way again (bad request, bad credentials, policy rejection) returns
/// false.
pub trait RetryableError {
    /// Returns true if this error should trigger another attempt.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for BackendError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
