//! Test utilities for orchestrator tests.
//!
//! This module provides a scripted backend, a clock that records sleeps,
//! and budget helpers.

use atelier_core::RateBudget;
use std::time::Duration;

pub mod mock_backend;
pub mod recording_clock;

#[allow(unused_imports)]
pub use mock_backend::{MockBackend, MockResponse};
#[allow(unused_imports)]
pub use recording_clock::RecordingClock;

/// A budget that never makes anyone wait.
#[allow(dead_code)]
pub fn open_budget() -> RateBudget {
    RateBudget::builder()
        .max_requests_per_window(1_000)
        .max_tokens_per_window(1_000_000)
        .window(Duration::from_secs(60))
        .min_interval(Duration::ZERO)
        .max_concurrent(16)
        .build()
        .expect("valid budget")
}
