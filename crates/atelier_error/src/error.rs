//! Top-level error wrapper types.

use crate::{
    BackendError, ConfigError, FailureReason, GenerationError, RateLimitError, RetryableError,
};

/// Every failure the orchestrator can surface, one variant per source.
///
/// # Examples
///
/// ```
/// use atelier_error::{AtelierError, BackendError};
///
/// let backend = BackendError::fatal("invalid api key");
/// let err: AtelierError = backend.into();
/// assert!(format!("{}", err).contains("Backend Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AtelierErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Classified backend failure
    #[from(BackendError)]
    Backend(BackendError),
    /// Rate limiter admission failure
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Coordinator failure
    #[from(GenerationError)]
    Generation(GenerationError),
}

/// Atelier error with kind discrimination.
///
/// # Examples
///
/// ```
/// use atelier_error::{AtelierResult, ConfigError};
///
/// fn might_fail() -> AtelierResult<()> {
///     Err(ConfigError::new("missing provider"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Atelier Error: {}", _0)]
pub struct AtelierError(Box<AtelierErrorKind>);

impl AtelierError {
    /// Create a new error from a kind.
    pub fn new(kind: AtelierErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AtelierErrorKind {
        &self.0
    }

    /// Consume the wrapper and return the kind.
    pub fn into_kind(self) -> AtelierErrorKind {
        *self.0
    }

    /// Classify this error as the reason an attempt did not win.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_error::{AtelierError, BackendError, FailureReason};
    ///
    /// let err = AtelierError::from(BackendError::quota("429"));
    /// assert!(matches!(err.failure_reason(), FailureReason::QuotaExceeded(_)));
    /// ```
    pub fn failure_reason(&self) -> FailureReason {
        match self.kind() {
            AtelierErrorKind::Backend(e) => e.kind().clone().into(),
            AtelierErrorKind::RateLimit(e) => e.kind().clone().into(),
            AtelierErrorKind::Config(e) => FailureReason::Fatal(e.message.clone()),
            AtelierErrorKind::Generation(e) => FailureReason::Fatal(e.kind.to_string()),
        }
    }
}

impl RetryableError for AtelierError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            AtelierErrorKind::Backend(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl<T> From<T> for AtelierError
where
    T: Into<AtelierErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Atelier operations.
pub type AtelierResult<T> = std::result::Result<T, AtelierError>;
