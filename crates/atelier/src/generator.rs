//! One-stop wiring from configuration to a ready coordinator.

use atelier_core::{ConcurrencyMode, ProgressReporter};
use atelier_error::AtelierResult;
use atelier_interface::GenerationBackend;
use atelier_orchestrator::{
    AcceptancePredicate, Coordinator, GenerationRequest, GenerationRequestBuilder,
    GenerationResult, RetryingClient,
};
use atelier_rate_limit::{AtelierConfig, RateLimiter};
use std::sync::Arc;

/// A configured generator for one backend.
///
/// Owns a [`Coordinator`] whose client shares an `Arc<RateLimiter>`. Build
/// further generators with [`Atelier::with_limiter`] to put several backends
/// or callers under one process-wide budget.
#[derive(Debug, Clone)]
pub struct Atelier {
    coordinator: Coordinator,
    mode: ConcurrencyMode,
}

impl Atelier {
    /// Build a generator with a fresh limiter for `provider`, falling back
    /// to the configured default provider.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the provider is unknown or any
    /// section fails validation.
    pub fn from_config(
        config: &AtelierConfig,
        provider: Option<&str>,
        backend: Arc<dyn GenerationBackend>,
    ) -> AtelierResult<Self> {
        let limiter = Arc::new(RateLimiter::new(config.budget_for(provider)?));
        Self::with_limiter(config, limiter, backend)
    }

    /// Build a generator that admits its calls through an existing limiter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the retry or coordinator section
    /// fails validation.
    pub fn with_limiter(
        config: &AtelierConfig,
        limiter: Arc<RateLimiter>,
        backend: Arc<dyn GenerationBackend>,
    ) -> AtelierResult<Self> {
        let policy = config.retry.to_policy()?;
        let settings = config.coordinator.to_settings()?;
        tracing::debug!(
            provider = backend.provider_name(),
            mode = %config.coordinator.mode,
            concurrency = settings.concurrency(),
            max_retries = policy.max_retries(),
            "Generator configured"
        );

        let client = RetryingClient::new(backend, limiter, policy);
        Ok(Self {
            coordinator: Coordinator::new(client, settings),
            mode: config.coordinator.mode,
        })
    }

    /// Send progress events to `progress`.
    pub fn with_progress(mut self, progress: impl Into<ProgressReporter>) -> Self {
        self.coordinator = self.coordinator.with_progress(progress);
        self
    }

    /// The shared limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        self.coordinator.client().limiter()
    }

    /// The underlying coordinator.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Start a request for `prompt` in the configured mode.
    pub fn request(&self, prompt: impl Into<String>) -> GenerationRequestBuilder {
        let mut builder = GenerationRequest::builder();
        builder.prompt(prompt).mode(self.mode);
        builder
    }

    /// Run `request` and return the first result `predicate` accepts.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::run`].
    pub async fn generate<P>(
        &self,
        request: &GenerationRequest,
        predicate: &P,
    ) -> AtelierResult<GenerationResult>
    where
        P: AcceptancePredicate + ?Sized,
    {
        self.coordinator.run(request, predicate).await
    }
}
