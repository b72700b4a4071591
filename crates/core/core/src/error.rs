//! Error types for the PushSMS SDK.
//!
//! This module defines the `SdkError` enum shared by the transport boundary
//! and the configuration helpers of the core crate.

use thiserror::Error;

/// The main error type for core SDK operations.
#[derive(Debug, Error)]
pub enum SdkError {
    // ==================== Transport Errors ====================
    /// The request could not be sent or the connection failed.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The request timed out.
    #[error("Request timeout")]
    Timeout,

    /// The URL could not be used for a request.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // ==================== Configuration Errors ====================
    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// A required configuration value is missing.
    #[error("Missing configuration: {key}")]
    MissingConfiguration { key: String },

    // ==================== Internal Errors ====================
    /// Serialization/deserialization failed.
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl SdkError {
    /// Creates a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Creates a new missing configuration error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingConfiguration { key: key.into() }
    }

    /// Returns true if retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout)
    }
}

/// A Result type alias using SdkError.
pub type SdkResult<T> = Result<T, SdkError>;

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "http-client")]
impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SdkError::missing("app_key");
        assert_eq!(err.to_string(), "Missing configuration: app_key");
    }

    #[test]
    fn test_is_transient() {
        assert!(SdkError::Timeout.is_transient());
        assert!(SdkError::transport("connection reset").is_transient());
        assert!(!SdkError::config("bad").is_transient());
    }

    #[test]
    fn test_from_serde_error() {
        let err: SdkError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, SdkError::SerializationError { .. }));
    }
}
