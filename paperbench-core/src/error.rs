use std::path::PathBuf;
use thiserror::Error;

/// Errors from the text-completion capability
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LlmError {
    /// No API key was provided
    #[error("Missing API key: set OPENAI_API_KEY or pass --api-key")]
    MissingApiKey,

    /// HTTP transport failure (connection, TLS, protocol)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A document could not be uploaded
    #[error("Failed to upload document {path}: {message}")]
    Upload { path: PathBuf, message: String },

    /// The response body could not be interpreted
    #[error("Failed to process response: {0}")]
    ResponseProcessing(String),

    /// Request timed out
    #[error("Request timed out after {0}ms")]
    Timeout(u64),
}

impl LlmError {
    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient errors that might succeed on retry:
    /// timeouts, rate limits (429), and server-side failures (5xx).
    /// Authentication and other client-side errors (4xx) are not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::timeout(LlmError::Timeout(5000), true)]
    #[case::rate_limit(LlmError::Api { status: 429, message: "quota".into() }, true)]
    #[case::server(LlmError::Api { status: 503, message: "overloaded".into() }, true)]
    #[case::auth(LlmError::Api { status: 401, message: "bad key".into() }, false)]
    #[case::bad_request(LlmError::Api { status: 400, message: "invalid".into() }, false)]
    #[case::missing_key(LlmError::MissingApiKey, false)]
    fn test_is_retryable(#[case] error: LlmError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[rstest]
    #[case::api(
        LlmError::Api { status: 500, message: "boom".into() },
        &["500", "boom"]
    )]
    #[case::upload(
        LlmError::Upload { path: "/tmp/a.pdf".into(), message: "no such file".into() },
        &["/tmp/a.pdf", "no such file"]
    )]
    #[case::timeout(LlmError::Timeout(5000), &["5000", "timed out"])]
    fn test_error_display(#[case] error: LlmError, #[case] expected: &[&str]) {
        let display = error.to_string();
        for s in expected {
            assert!(display.contains(s), "Expected '{}' in '{}'", s, display);
        }
    }
}
