//! Unified error types for granola-mcp.
//!
//! Every variant renders with a stable code prefix so callers can tell
//! "not authenticated" from "backend unreachable" from "not found" without logs.

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::config::ConfigError;

/// Unified error types for the granola-mcp server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (bad timestamp, empty query, malformed cursor).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Cursor was produced for a different document set.
    #[error("STALE_CURSOR: {0}")]
    StaleCursor(String),

    /// No meeting with the given id.
    #[error("NOT_FOUND: meeting {0}")]
    NotFound(String),

    /// Missing or invalid configuration (local file absent, no token, bad base URL).
    #[error("CONFIG_ERROR: {0}")]
    Config(String),

    /// Backend rejected the bearer token (HTTP 401/403).
    #[error("NOT_AUTHENTICATED: {0}")]
    Auth(String),

    /// Backend rejected the client identification headers.
    #[error("UNSUPPORTED_CLIENT: {0}")]
    UnsupportedClient(String),

    /// Backend rate limited every attempt.
    #[error("RATE_LIMITED: {0}")]
    RateLimited(String),

    /// Request timed out on every attempt.
    #[error("BACKEND_UNREACHABLE: timeout: {0}")]
    Timeout(String),

    /// Network failure on every attempt.
    #[error("BACKEND_UNREACHABLE: {0}")]
    Network(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: status {status}: {message}")]
    Http { status: u16, message: String },

    /// A whole page or file could not be decoded.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// Cache directory I/O failed.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),

    /// Anything else.
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl Error {
    /// Whether a page fetch that failed with this error should be attempted again.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimited(_) | Error::Timeout(_) | Error::Network(_) => true,
            Error::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Cache(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) | Error::StaleCursor(_) => -32602,
            Error::Parse(_) => -32000,
            Error::NotFound(_) => -32001,
            Error::Cache(_) => -32002,
            Error::Config(_) => -32003,
            Error::Auth(_) => -32004,
            Error::UnsupportedClient(_) => -32005,
            Error::Timeout(_) => -32006,
            Error::Network(_) => -32007,
            Error::Http { .. } => -32008,
            Error::RateLimited(_) => -32010,
            Error::Internal(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("abc123".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::NotFound("abc123".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);
        assert!(mcp_err.message.contains("abc123"));
    }

    #[test]
    fn test_validation_errors_share_invalid_params_code() {
        let invalid: McpError = Error::InvalidInput("limit".into()).into();
        let stale: McpError = Error::StaleCursor("cursor".into()).into();
        assert_eq!(invalid.code.0, -32602);
        assert_eq!(stale.code.0, -32602);
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::Timeout("x".into()).is_transient());
        assert!(Error::Network("x".into()).is_transient());
        assert!(Error::RateLimited("x".into()).is_transient());
        assert!(Error::Http { status: 503, message: String::new() }.is_transient());
        assert!(!Error::Http { status: 404, message: String::new() }.is_transient());
        assert!(!Error::Auth("x".into()).is_transient());
        assert!(!Error::UnsupportedClient("x".into()).is_transient());
        assert!(!Error::Parse("x".into()).is_transient());
    }

    #[test]
    fn test_auth_and_unreachable_are_distinguishable() {
        let auth = Error::Auth("expired".into()).to_string();
        let net = Error::Network("refused".into()).to_string();
        assert!(auth.starts_with("NOT_AUTHENTICATED"));
        assert!(net.starts_with("BACKEND_UNREACHABLE"));
    }
}
