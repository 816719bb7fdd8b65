//! Helpers for backends built on HTTP-like transports.

use atelier_error::BackendError;

/// Turn a status code and body into a backend outcome.
///
/// 2xx yields the body; anything else is classified with
/// [`BackendError::from_status`], using the body as the message.
///
/// # Examples
///
/// ```
/// use atelier_error::{BackendErrorKind, RetryableError};
/// use atelier_interface::classify_response;
///
/// assert_eq!(classify_response(200, "hello".into()).unwrap(), "hello");
///
/// let err = classify_response(429, "rate limited".into()).unwrap_err();
/// assert!(matches!(err.kind(), BackendErrorKind::QuotaExceeded(_)));
/// assert!(err.is_retryable());
/// ```
#[track_caller]
pub fn classify_response(status_code: u16, body: String) -> Result<String, BackendError> {
    if (200..300).contains(&status_code) {
        Ok(body)
    } else {
        Err(BackendError::from_status(status_code, body))
    }
}
