//! Backend transport errors.

use std::fmt;

use serde_json::Value;

use crate::events::CodecError;

/// Error categories for backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Non-success HTTP status.
    HttpStatus,
    /// Request or stream timed out.
    Timeout,
    /// Could not reach the backend.
    Connect,
    /// Response body or stream frame did not decode.
    Parse,
    /// The event stream broke off.
    Stream,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendErrorKind::HttpStatus => write!(f, "http_status"),
            BackendErrorKind::Timeout => write!(f, "timeout"),
            BackendErrorKind::Connect => write!(f, "connect"),
            BackendErrorKind::Parse => write!(f, "parse"),
            BackendErrorKind::Stream => write!(f, "stream"),
        }
    }
}

/// Structured backend error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub kind: BackendErrorKind,
    /// One-line summary suitable for display.
    pub message: String,
    /// Optional additional details (e.g., raw error body).
    pub details: Option<String>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, unwrapping the backend's
    /// `{"detail": "..."}` envelope when present.
    pub fn http_status(status: u16, body: &str) -> Self {
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(detail) = json.get("detail").and_then(Value::as_str)
        {
            return Self {
                kind: BackendErrorKind::HttpStatus,
                message: format!("HTTP {status}: {detail}"),
                details: Some(body.to_string()),
            };
        }
        Self {
            kind: BackendErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message)
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Stream, message)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BackendError {}

impl From<CodecError> for BackendError {
    fn from(err: CodecError) -> Self {
        Self {
            kind: BackendErrorKind::Parse,
            message: err.message,
            details: Some(err.raw),
        }
    }
}

pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        BackendError::new(BackendErrorKind::Connect, format!("Connection failed: {e}"))
    } else if e.is_decode() {
        BackendError::new(BackendErrorKind::Parse, format!("Invalid response body: {e}"))
    } else {
        BackendError::new(BackendErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_unwraps_detail() {
        let err = BackendError::http_status(404, r#"{"detail":"Conversation not found"}"#);
        assert_eq!(err.kind, BackendErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 404: Conversation not found");
        assert!(err.details.is_some());
    }

    #[test]
    fn test_http_status_plain_body() {
        let err = BackendError::http_status(500, "");
        assert_eq!(err.message, "HTTP 500");
        assert_eq!(err.details, None);

        let err = BackendError::http_status(502, "bad gateway");
        assert_eq!(err.details.as_deref(), Some("bad gateway"));
    }
}
