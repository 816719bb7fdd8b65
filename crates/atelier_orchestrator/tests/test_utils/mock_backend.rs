//! Scripted generation backend.

use async_trait::async_trait;
use atelier_error::{BackendError, BackendErrorKind};
use atelier_interface::GenerationBackend;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted backend reply.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// How long the call takes.
    pub delay: Duration,
    /// What the call returns.
    pub outcome: Result<String, BackendErrorKind>,
}

#[allow(dead_code)]
impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self::text_after(text, Duration::ZERO)
    }

    pub fn text_after(text: &str, delay: Duration) -> Self {
        Self {
            delay,
            outcome: Ok(text.to_string()),
        }
    }

    pub fn error(kind: BackendErrorKind) -> Self {
        Self::error_after(kind, Duration::ZERO)
    }

    pub fn error_after(kind: BackendErrorKind, delay: Duration) -> Self {
        Self {
            delay,
            outcome: Err(kind),
        }
    }

    pub fn quota() -> Self {
        Self::error(BackendErrorKind::QuotaExceeded("HTTP 429".to_string()))
    }

    pub fn fatal() -> Self {
        Self::error(BackendErrorKind::Fatal("HTTP 401: bad key".to_string()))
    }
}

/// Backend that replays responses in call order.
///
/// Once the script runs out, every further call gets the fallback.
#[derive(Debug)]
pub struct MockBackend {
    script: Mutex<VecDeque<MockResponse>>,
    fallback: MockResponse,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new(script: Vec<MockResponse>) -> Self {
        Self::with_fallback(script, MockResponse::fatal())
    }

    pub fn with_fallback(script: Vec<MockResponse>, fallback: MockResponse) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn repeating(response: MockResponse) -> Self {
        Self::with_fallback(Vec::new(), response)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn invoke(&self, _prompt: &str, _max_tokens: u32) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.outcome.map_err(BackendError::new)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
