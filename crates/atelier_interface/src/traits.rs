//! Trait definitions for generation backends.

use async_trait::async_trait;
use atelier_error::BackendError;
use std::sync::Arc;

/// Core trait that every generation backend must implement.
///
/// A backend performs exactly one outbound call per `invoke`. It must not
/// retry, throttle or sleep on its own: admission and retries belong to the
/// orchestrator. Failures are reported already classified, so callers never
/// see transport-level errors.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use atelier_error::BackendError;
/// use atelier_interface::GenerationBackend;
///
/// struct Echo;
///
/// #[async_trait]
/// impl GenerationBackend for Echo {
///     async fn invoke(&self, prompt: &str, _max_tokens: u32) -> Result<String, BackendError> {
///         Ok(prompt.to_string())
///     }
///
///     fn provider_name(&self) -> &str {
///         "echo"
///     }
/// }
/// ```
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for `prompt`, producing at most `max_tokens` tokens.
    async fn invoke(&self, prompt: &str, max_tokens: u32) -> Result<String, BackendError>;

    /// Provider name (e.g., "anthropic", "openai", "gemini").
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<T> GenerationBackend for Arc<T>
where
    T: GenerationBackend + ?Sized,
{
    async fn invoke(&self, prompt: &str, max_tokens: u32) -> Result<String, BackendError> {
        (**self).invoke(prompt, max_tokens).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}
