//! Backoff schedule and retry policy for backend calls.

use atelier_error::ConfigError;
use std::time::Duration;

/// Ordered backoff delays indexed by retry count.
///
/// Retries beyond the end of the schedule reuse the last entry.
///
/// # Examples
///
/// ```
/// use atelier_core::RetrySchedule;
/// use std::time::Duration;
///
/// let schedule = RetrySchedule::default();
/// assert_eq!(schedule.delay_for(0), Duration::from_secs(5));
/// assert_eq!(schedule.delay_for(2), Duration::from_secs(45));
/// assert_eq!(schedule.delay_for(7), Duration::from_secs(45));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    /// Create a schedule from explicit delays.
    ///
    /// # Errors
    ///
    /// Returns an error if `delays` is empty.
    pub fn new(delays: Vec<Duration>) -> Result<Self, ConfigError> {
        if delays.is_empty() {
            return Err(ConfigError::invalid(
                "retry_schedule",
                "must contain at least one delay",
            ));
        }
        Ok(Self { delays })
    }

    /// Geometric schedule: `base`, `base * factor`, `base * factor^2`, ...
    ///
    /// # Errors
    ///
    /// Returns an error if `steps` is zero.
    pub fn exponential(base: Duration, factor: u32, steps: usize) -> Result<Self, ConfigError> {
        let delays = std::iter::successors(Some(base), |d| d.checked_mul(factor))
            .take(steps)
            .collect();
        Self::new(delays)
    }

    /// Delay to wait before retry number `retry_index` (zero-based).
    pub fn delay_for(&self, retry_index: usize) -> Duration {
        let last = self.delays.len() - 1;
        self.delays[retry_index.min(last)]
    }

    /// The configured delays.
    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            delays: vec![
                Duration::from_secs(5),
                Duration::from_secs(15),
                Duration::from_secs(45),
            ],
        }
    }
}

/// How many times a backend call is tried, and how long to wait in between.
///
/// `max_retries` counts calls in total, so the default of 3 means one
/// initial call plus up to two retries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct RetryPolicy {
    /// Total calls allowed per attempt.
    max_retries: u32,

    /// Backoff between calls.
    schedule: RetrySchedule,

    /// Upper bound on a single backend call; `None` waits indefinitely.
    call_timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Create a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_retries` is zero.
    pub fn new(max_retries: u32, schedule: RetrySchedule) -> Result<Self, ConfigError> {
        if max_retries == 0 {
            return Err(ConfigError::invalid("max_retries", "must be at least 1"));
        }
        Ok(Self {
            max_retries,
            schedule,
            call_timeout: Some(Duration::from_secs(120)),
        })
    }

    /// Replace the per-call timeout.
    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            schedule: RetrySchedule::default(),
            call_timeout: Some(Duration::from_secs(120)),
        }
    }
}
