//! Rate budget: the provider-imposed ceilings the limiter enforces.

use atelier_error::ConfigError;
use std::time::Duration;

/// Request, token and concurrency ceilings over a trailing window.
///
/// A budget is immutable once built and always valid: every instance has
/// passed [`RateBudgetBuilder::build`].
///
/// # Examples
///
/// ```
/// use atelier_core::RateBudget;
/// use std::time::Duration;
///
/// let budget = RateBudget::builder()
///     .max_requests_per_window(50)
///     .max_tokens_per_window(7_500)
///     .window(Duration::from_secs(60))
///     .min_interval(Duration::from_secs(2))
///     .max_concurrent(2)
///     .build()
///     .unwrap();
///
/// assert_eq!(*budget.max_requests_per_window(), 50);
/// assert!(budget.admits_estimate(7_500));
/// assert!(!budget.admits_estimate(7_501));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct RateBudget {
    /// Grants allowed within one trailing window.
    max_requests_per_window: u32,

    /// Sum of token estimates allowed within one trailing window.
    max_tokens_per_window: u64,

    /// Length of the trailing window.
    window: Duration,

    /// Minimum spacing between consecutive grants.
    min_interval: Duration,

    /// Admissions allowed in flight at once.
    max_concurrent: u32,
}

impl RateBudget {
    /// Creates a new budget builder.
    pub fn builder() -> RateBudgetBuilder {
        RateBudgetBuilder::default()
    }

    /// Whether a single request of `estimated_tokens` can ever be admitted.
    pub fn admits_estimate(&self, estimated_tokens: u64) -> bool {
        estimated_tokens <= self.max_tokens_per_window
    }
}

impl Default for RateBudget {
    /// Claude Sonnet limits: 1000 requests and 450K tokens per minute,
    /// 100ms spacing, one call in flight.
    fn default() -> Self {
        Self {
            max_requests_per_window: 1000,
            max_tokens_per_window: 450_000,
            window: Duration::from_secs(60),
            min_interval: Duration::from_millis(100),
            max_concurrent: 1,
        }
    }
}

/// Builder for [`RateBudget`].
///
/// Unset fields fall back to [`RateBudget::default`].
#[derive(Debug, Default, Clone)]
pub struct RateBudgetBuilder {
    max_requests_per_window: Option<u32>,
    max_tokens_per_window: Option<u64>,
    window: Option<Duration>,
    min_interval: Option<Duration>,
    max_concurrent: Option<u32>,
}

impl RateBudgetBuilder {
    /// Sets the request ceiling per window.
    pub fn max_requests_per_window(mut self, value: u32) -> Self {
        self.max_requests_per_window = Some(value);
        self
    }

    /// Sets the token ceiling per window.
    pub fn max_tokens_per_window(mut self, value: u64) -> Self {
        self.max_tokens_per_window = Some(value);
        self
    }

    /// Sets the trailing window length.
    pub fn window(mut self, value: Duration) -> Self {
        self.window = Some(value);
        self
    }

    /// Sets the minimum spacing between grants.
    pub fn min_interval(mut self, value: Duration) -> Self {
        self.min_interval = Some(value);
        self
    }

    /// Sets the in-flight ceiling.
    pub fn max_concurrent(mut self, value: u32) -> Self {
        self.max_concurrent = Some(value);
        self
    }

    /// Validates and builds the budget.
    ///
    /// # Errors
    ///
    /// Returns an error if any ceiling is zero, the window is zero, or the
    /// minimum interval exceeds the window.
    pub fn build(self) -> Result<RateBudget, ConfigError> {
        let defaults = RateBudget::default();
        let budget = RateBudget {
            max_requests_per_window: self
                .max_requests_per_window
                .unwrap_or(defaults.max_requests_per_window),
            max_tokens_per_window: self
                .max_tokens_per_window
                .unwrap_or(defaults.max_tokens_per_window),
            window: self.window.unwrap_or(defaults.window),
            min_interval: self.min_interval.unwrap_or(defaults.min_interval),
            max_concurrent: self.max_concurrent.unwrap_or(defaults.max_concurrent),
        };

        if budget.max_requests_per_window == 0 {
            return Err(ConfigError::invalid(
                "max_requests_per_window",
                "must be at least 1",
            ));
        }
        if budget.max_tokens_per_window == 0 {
            return Err(ConfigError::invalid(
                "max_tokens_per_window",
                "must be at least 1",
            ));
        }
        if budget.window.is_zero() {
            return Err(ConfigError::invalid("window", "must be non-zero"));
        }
        if budget.max_concurrent == 0 {
            return Err(ConfigError::invalid("max_concurrent", "must be at least 1"));
        }
        if budget.min_interval > budget.window {
            return Err(ConfigError::invalid(
                "min_interval",
                format!(
                    "{:?} exceeds the {:?} window",
                    budget.min_interval, budget.window
                ),
            ));
        }

        Ok(budget)
    }
}
