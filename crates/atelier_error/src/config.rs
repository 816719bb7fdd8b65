//! Configuration error types.

/// Configuration error with source location.
///
/// Raised when a configuration file cannot be loaded or when a budget, retry
/// policy or coordinator setting fails validation at construction time.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_error::ConfigError;
    ///
    /// let err = ConfigError::new("window must be non-zero");
    /// assert!(err.message.contains("non-zero"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an error for a single invalid option.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_error::ConfigError;
    ///
    /// let err = ConfigError::invalid("max_concurrent", "must be at least 1");
    /// assert_eq!(err.message, "invalid max_concurrent: must be at least 1");
    /// ```
    #[track_caller]
    pub fn invalid(option: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(format!("invalid {}: {}", option, reason))
    }
}
