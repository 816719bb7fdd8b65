//! Trait definitions for the Atelier generation orchestrator.
//!
//! Providers plug into the orchestrator by implementing
//! [`GenerationBackend`]. Everything above this trait is provider-agnostic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod status;
mod traits;

pub use status::classify_response;
pub use traits::GenerationBackend;
