//! Errors for rate limiter admission.

/// Reasons an admission request can end without a grant.
///
/// The limiter never fails because a budget is exhausted; it waits. These
/// kinds cover requests that can never be satisfied and waits that were
/// abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// A single request estimate larger than the whole token window
    #[display(
        "Estimated {} tokens can never fit a window of {} tokens",
        estimated,
        budget
    )]
    EstimateExceedsBudget {
        /// Tokens requested
        estimated: u64,
        /// Tokens allowed per window
        budget: u64,
    },
    /// The caller cancelled while waiting for admission
    #[display("Admission cancelled while waiting")]
    Cancelled,
}

/// Rate limiting error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    kind: RateLimitErrorKind,
    line: u32,
    file: &'static str,
}

impl RateLimitError {
    /// Create a new rate limiting error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RateLimitErrorKind {
        &self.kind
    }

    /// True if the wait was abandoned through cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.kind == RateLimitErrorKind::Cancelled
    }
}

impl From<RateLimitErrorKind> for RateLimitError {
    #[track_caller]
    fn from(kind: RateLimitErrorKind) -> Self {
        Self::new(kind)
    }
}
