//! Acceptance predicates.

use atelier_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Decides whether a generated text is good enough to stop further attempts.
///
/// Implementations must be pure: no I/O, no side effects. Any
/// `Fn(&str) -> bool` closure is a predicate.
pub trait AcceptancePredicate {
    /// Whether `text` is acceptable.
    fn accepts(&self, text: &str) -> bool;
}

impl<F> AcceptancePredicate for F
where
    F: Fn(&str) -> bool,
{
    fn accepts(&self, text: &str) -> bool {
        self(text)
    }
}

/// Accepts texts whose character count lies in an inclusive range.
///
/// # Example
///
/// ```
/// use atelier_orchestrator::{AcceptancePredicate, LengthRange};
///
/// let range = LengthRange::new(5, 10).unwrap();
/// assert!(range.accepts("hello"));
/// assert!(!range.accepts("hi"));
/// assert_eq!(range.midpoint(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct LengthRange {
    /// Fewest characters accepted.
    min: usize,
    /// Most characters accepted.
    max: usize,
}

impl LengthRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns an error if `min > max`.
    pub fn new(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::invalid(
                "length_range",
                format!("min {} exceeds max {}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    /// Target length to ask the backend for.
    pub fn midpoint(&self) -> usize {
        self.min + (self.max - self.min) / 2
    }

    /// The range as a standard inclusive range.
    pub fn as_range(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl AcceptancePredicate for LengthRange {
    fn accepts(&self, text: &str) -> bool {
        self.as_range().contains(&text.chars().count())
    }
}
