//! A request for one coordinator run.

use atelier_core::ConcurrencyMode;
use atelier_error::{GenerationError, GenerationErrorKind};

/// What to generate and how many attempts to spend on it.
///
/// # Example
///
/// ```
/// use atelier_core::ConcurrencyMode;
/// use atelier_orchestrator::GenerationRequest;
///
/// let request = GenerationRequest::builder()
///     .prompt("Write a 400 character story about a lighthouse")
///     .attempt_count(4_usize)
///     .mode(ConcurrencyMode::Concurrent)
///     .build()
///     .unwrap();
///
/// assert_eq!(*request.attempt_count(), 4);
/// assert_eq!(*request.estimated_tokens(), 6_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct GenerationRequest {
    /// Prompt sent to the backend on every attempt.
    prompt: String,

    /// Independent attempts to make at most.
    #[builder(default = "1")]
    attempt_count: usize,

    /// Sequential or concurrent scheduling.
    #[builder(default)]
    mode: ConcurrencyMode,

    /// Token estimate charged to the rate limiter per backend call,
    /// covering input and output.
    #[builder(default = "6_000")]
    estimated_tokens: u64,
}

impl GenerationRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }
}

impl GenerationRequestBuilder {
    /// Build the request.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationErrorKind::InvalidRequest`] if the prompt is
    /// missing or `attempt_count` is zero.
    pub fn build(&self) -> Result<GenerationRequest, GenerationError> {
        let request = self.build_internal().map_err(|e| {
            GenerationError::new(GenerationErrorKind::InvalidRequest(e.to_string()))
        })?;
        if request.attempt_count == 0 {
            return Err(GenerationError::new(GenerationErrorKind::InvalidRequest(
                "attempt_count must be at least 1".to_string(),
            )));
        }
        Ok(request)
    }
}
