//! Error types for the triage pipeline.

use thiserror::Error;

/// Result type alias using the triage Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for triage operations.
///
/// Recoverable conditions (`ServiceUnavailable`, `RateLimited`,
/// `InvalidResponse`, `Request`) are handled inside the orchestrator by
/// routing to the keyword fallback; only `NoValidInput` and `Cancelled`
/// are surfaced to callers of the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// No generation backend is configured (no API key). Routes to fallback.
    #[error("AI service unavailable: no generation backend configured")]
    ServiceUnavailable,

    /// The sliding-window rate limit refused the request. Routes to fallback.
    #[error("Rate limit exceeded for AI requests")]
    RateLimited,

    /// The AI service returned output that failed strict validation.
    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),

    /// Caller supplied no usable input text.
    #[error("No valid input: {0}")]
    NoValidInput(String),

    /// Recording a user correction failed. Logged and swallowed.
    #[error("Correction tracking error: {0}")]
    CorrectionTracking(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The run was cancelled cooperatively; partial results are discarded.
    #[error("Classification run cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// True for conditions the orchestrator absorbs by falling back.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ServiceUnavailable
                | Error::RateLimited
                | Error::InvalidResponse(_)
                | Error::Request(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_service_unavailable() {
        let err = Error::ServiceUnavailable;
        assert!(err.to_string().contains("no generation backend"));
    }

    #[test]
    fn test_error_display_invalid_response() {
        let err = Error::InvalidResponse("length mismatch".to_string());
        assert_eq!(err.to_string(), "Invalid AI response: length mismatch");
    }

    #[test]
    fn test_error_display_no_valid_input() {
        let err = Error::NoValidInput("all texts empty".to_string());
        assert_eq!(err.to_string(), "No valid input: all texts empty");
    }

    #[test]
    fn test_error_display_rate_limited() {
        let err = Error::RateLimited;
        assert!(err.to_string().contains("Rate limit"));
    }

    #[test]
    fn test_error_display_cancelled() {
        assert_eq!(Error::Cancelled.to_string(), "Classification run cancelled");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::ServiceUnavailable.is_recoverable());
        assert!(Error::RateLimited.is_recoverable());
        assert!(Error::InvalidResponse("x".into()).is_recoverable());
        assert!(Error::Request("timeout".into()).is_recoverable());

        assert!(!Error::NoValidInput("x".into()).is_recoverable());
        assert!(!Error::Cancelled.is_recoverable());
        assert!(!Error::Config("x".into()).is_recoverable());
        assert!(!Error::Internal("x".into()).is_recoverable());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
