//! Atelier - rate-limited text generation
//!
//! Atelier sits between a caller that wants one acceptable piece of generated
//! text and a remote generation backend that throttles. It keeps aggregate
//! traffic under the provider's request, token and concurrency ceilings,
//! retries throttling and transient failures on a backoff schedule, and runs
//! several independent attempts until one passes an acceptance check.
//!
//! # Features
//!
//! - **Sliding-window admission**: requests and tokens per window, minimum
//!   spacing, and a ceiling on calls in flight, shared process-wide
//! - **Classified retries**: quota and transient failures back off, fatal
//!   failures stop at once
//! - **Multi-attempt coordination**: sequential or concurrent attempts,
//!   lowest index wins ties, losers are cancelled
//! - **TOML configuration**: bundled defaults, user overrides, provider presets
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use atelier::{Atelier, AtelierConfig, LengthRange};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     atelier::init_tracing()?;
//!
//!     let config = AtelierConfig::load()?;
//!     let atelier = Atelier::from_config(&config, None, Arc::new(MyBackend::new()))?;
//!
//!     let range = LengthRange::new(400, 600)?;
//!     let request = atelier
//!         .request(format!("Write a {} character story", range.midpoint()))
//!         .attempt_count(3_usize)
//!         .build()?;
//!
//!     let result = atelier.generate(&request, &range).await?;
//!     println!("{}", result.text());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `otel` - OpenTelemetry span export via `init_telemetry`
//!
//! # Architecture
//!
//! Atelier is organized as a workspace with focused crates:
//!
//! - `atelier_error` - Error types
//! - `atelier_core` - Clock, budgets, retry policy, cancellation, progress
//! - `atelier_interface` - `GenerationBackend` trait definition
//! - `atelier_rate_limit` - Sliding-window limiter and configuration
//! - `atelier_orchestrator` - Retrying client and coordinator
//!
//! This crate (`atelier`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod generator;

pub use generator::Atelier;

// Re-export workspace crates
pub use atelier_core::*;
pub use atelier_error::*;
pub use atelier_interface::*;
pub use atelier_orchestrator::*;
pub use atelier_rate_limit::*;
