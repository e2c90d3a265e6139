//! Error types for zonesync
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zonesync
#[derive(Error, Debug)]
pub enum Error {
    /// The remote service rejected our credentials or permissions (HTTP 403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Any other non-2xx response from the remote service
    #[error("HTTP error: status {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the service
        body: String,
    },

    /// Transport-level failure (connect, timeout, malformed response)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A wire record could not be mapped to or from its canonical form
    #[error("Codec error: {0}")]
    Codec(String),

    /// A canonical record failed validation
    #[error("Invalid record {fqdn} ({record_type}): {reasons}")]
    InvalidRecord {
        /// Fully-qualified name of the record
        fqdn: String,
        /// Record type
        record_type: String,
        /// Validation failures, joined with "; "
        reasons: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a codec error
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the remote service rejecting credentials
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_includes_status_and_body() {
        let err = Error::http(502, "bad gateway");
        assert_eq!(err.to_string(), "HTTP error: status 502: bad gateway");
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_auth_error_is_classified() {
        let err = Error::auth("Invalid request headers");
        assert!(err.is_authentication());
        assert_eq!(err.to_string(), "Authentication failed: Invalid request headers");
    }
}
