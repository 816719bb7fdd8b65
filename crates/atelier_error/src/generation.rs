//! Coordinator-level error types.

use crate::{BackendErrorKind, RateLimitErrorKind};

/// Why a single generation attempt did not produce the accepted result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FailureReason {
    /// Backend kept signalling throttling until retries ran out
    #[display("quota exceeded: {}", _0)]
    QuotaExceeded(String),
    /// Connectivity or timeout failures until retries ran out
    #[display("transient failure: {}", _0)]
    Transient(String),
    /// Non-retryable backend failure
    #[display("fatal failure: {}", _0)]
    Fatal(String),
    /// The backend answered but the acceptance predicate said no
    #[display("rejected by predicate ({} chars)", text.chars().count())]
    Rejected {
        /// The text that was judged unacceptable
        text: String,
    },
    /// The attempt was stopped before producing a result
    #[display("cancelled")]
    Cancelled,
    /// The attempt's token estimate can never fit the configured window
    #[display("over budget: {}", _0)]
    OverBudget(String),
}

impl FailureReason {
    /// True when the attempt produced text that the predicate turned down.
    pub fn is_rejection(&self) -> bool {
        matches!(self, FailureReason::Rejected { .. })
    }
}

impl From<BackendErrorKind> for FailureReason {
    fn from(kind: BackendErrorKind) -> Self {
        match kind {
            BackendErrorKind::QuotaExceeded(msg) => FailureReason::QuotaExceeded(msg),
            BackendErrorKind::Transient(msg) => FailureReason::Transient(msg),
            BackendErrorKind::Timeout(after) => {
                FailureReason::Transient(format!("timed out after {:?}", after))
            }
            BackendErrorKind::Fatal(msg) => FailureReason::Fatal(msg),
        }
    }
}

impl From<RateLimitErrorKind> for FailureReason {
    fn from(kind: RateLimitErrorKind) -> Self {
        match kind {
            RateLimitErrorKind::Cancelled => FailureReason::Cancelled,
            other @ RateLimitErrorKind::EstimateExceedsBudget { .. } => {
                FailureReason::OverBudget(other.to_string())
            }
        }
    }
}

/// The recorded outcome of one attempt that did not win.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display("attempt {}: {}", index, reason)]
pub struct AttemptFailure {
    /// Attempt index, starting at zero
    pub index: usize,
    /// Why the attempt did not win
    pub reason: FailureReason,
}

impl AttemptFailure {
    /// Create a new attempt failure record.
    pub fn new(index: usize, reason: impl Into<FailureReason>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

/// Specific error conditions for a coordinator run.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GenerationErrorKind {
    /// No attempt produced an acceptable result
    #[display("All {} attempts failed", failures.len())]
    AllAttemptsFailed {
        /// One record per attempt, ordered by index
        failures: Vec<AttemptFailure>,
    },
    /// The run itself was malformed
    #[display("Invalid generation request: {}", _0)]
    InvalidRequest(String),
}

/// Generation error with location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{AttemptFailure, FailureReason, GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::AllAttemptsFailed {
///     failures: vec![AttemptFailure::new(0, FailureReason::Cancelled)],
/// });
/// assert_eq!(err.failures().len(), 1);
/// assert!(format!("{}", err).contains("All 1 attempts failed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error kind
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new generation error.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Per-attempt failure records, empty for malformed requests.
    pub fn failures(&self) -> &[AttemptFailure] {
        match &self.kind {
            GenerationErrorKind::AllAttemptsFailed { failures } => failures,
            GenerationErrorKind::InvalidRequest(_) => &[],
        }
    }

    /// Texts that were produced but rejected by the acceptance predicate.
    pub fn rejected_texts(&self) -> impl Iterator<Item = &str> {
        self.failures().iter().filter_map(|f| match &f.reason {
            FailureReason::Rejected { text } => Some(text.as_str()),
            _ => None,
        })
    }
}
