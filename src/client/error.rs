//! Error types for backend calls.

use thiserror::Error;

/// Errors that can occur while talking to the factory-cell backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Connection refused, DNS failure, reset, etc.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured deadline.
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// Backend answered with a non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Parse(String),

    /// Backend answered but reported a non-success status.
    #[error("backend rejected request: {0}")]
    Rejected(String),

    /// Missing or malformed user input, detected before any request is sent.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl ClientError {
    /// Classify a reqwest error.
    pub fn from_reqwest(e: reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(timeout_ms)
        } else if e.is_decode() {
            ClientError::Parse(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ClientError::Http(503).to_string(), "HTTP error: 503");
        assert_eq!(
            ClientError::Timeout(5000).to_string(),
            "request timeout after 5000ms"
        );
        assert_eq!(
            ClientError::Validation("RTSP URL is required".to_string()).to_string(),
            "invalid input: RTSP URL is required"
        );
    }
}
