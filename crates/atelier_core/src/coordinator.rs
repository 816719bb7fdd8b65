//! Settings for the generation coordinator.

use atelier_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a coordinator schedules its attempts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// One attempt at a time, in index order, with a pause in between.
    #[default]
    #[display("sequential")]
    Sequential,
    /// Up to `concurrency` attempts in flight; the first acceptable one wins.
    #[display("concurrent")]
    Concurrent,
}

/// Coordinator tuning, independent of the rate limiter's own ceilings.
///
/// # Examples
///
/// ```
/// use atelier_core::CoordinatorSettings;
/// use std::time::Duration;
///
/// let settings = CoordinatorSettings::default();
/// assert_eq!(*settings.concurrency(), 2);
/// assert_eq!(*settings.inter_attempt_delay(), Duration::from_secs(2));
///
/// assert!(CoordinatorSettings::new(0, Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct CoordinatorSettings {
    /// Attempts allowed in flight at once in concurrent mode.
    concurrency: usize,

    /// Pause between sequential attempts.
    inter_attempt_delay: Duration,
}

impl CoordinatorSettings {
    /// Create validated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `concurrency` is zero.
    pub fn new(concurrency: usize, inter_attempt_delay: Duration) -> Result<Self, ConfigError> {
        if concurrency == 0 {
            return Err(ConfigError::invalid(
                "coordinator_concurrency",
                "must be at least 1",
            ));
        }
        Ok(Self {
            concurrency,
            inter_attempt_delay,
        })
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            concurrency: 2,
            inter_attempt_delay: Duration::from_secs(2),
        }
    }
}
