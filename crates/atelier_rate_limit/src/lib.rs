//! Sliding-window rate limiting for backend calls.
//!
//! This crate provides admission control that keeps aggregate request and
//! token volume under provider ceilings:
//!
//! - [`RateLimiter`] enforces a [`RateBudget`](atelier_core::RateBudget):
//!   requests and tokens over a trailing window, minimum spacing between
//!   grants, and a ceiling on calls in flight.
//! - [`BudgetPreset`] names known provider budgets.
//! - [`AtelierConfig`] loads budgets, retry policy and coordinator settings
//!   from TOML.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod presets;
mod window;

pub use config::{AtelierConfig, CoordinatorConfig, ProviderConfig, RetryConfig};
pub use limiter::{RateLimiter, RateLimiterGuard, UsageSnapshot};
pub use presets::BudgetPreset;
