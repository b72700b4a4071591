//! Callback error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::notification::NotificationKind;

/// Result type for callback operations.
pub type CallbackResult<T> = Result<T, CallbackError>;

/// A payload that matched none of the tolerated encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} payload: {reason}")]
pub struct DecodeError {
    /// Notification type being decoded.
    pub kind: NotificationKind,
    /// The `data` string exactly as received.
    pub raw: String,
    /// What went wrong.
    pub reason: String,
}

impl DecodeError {
    /// Creates a decode error.
    pub fn new(kind: NotificationKind, raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// Error type for callback operations.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Signature mismatch.
    #[error("Invalid signature")]
    Authentication,

    /// A required request field is missing or unusable.
    #[error("Missing or invalid field: {field}")]
    Validation { field: String },

    /// Payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Unknown notification type tag.
    #[error("Unsupported notification type: {tag}")]
    UnsupportedType { tag: String },

    /// An application processor failed or panicked.
    #[error("Processor for {kind} failed: {message}")]
    Processor {
        kind: NotificationKind,
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Listener I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CallbackError {
    /// Creates a validation error.
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns the HTTP status the vendor sees for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::FORBIDDEN,
            Self::Validation { .. } | Self::Decode(_) | Self::UnsupportedType { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Processor { .. } | Self::Configuration { .. } | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CallbackError::Authentication.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            CallbackError::validation("echostr").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CallbackError::UnsupportedType {
                tag: "SMS_UNKNOWN".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CallbackError::from(DecodeError::new(NotificationKind::Report, "{", "eof"))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CallbackError::Processor {
                kind: NotificationKind::Reply,
                message: "boom".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = CallbackError::UnsupportedType {
            tag: "SMS_UNKNOWN".into(),
        };
        assert_eq!(err.to_string(), "Unsupported notification type: SMS_UNKNOWN");

        let err = DecodeError::new(NotificationKind::TemplateAudit, "[]", "expected object");
        assert_eq!(err.to_string(), "Invalid SMS_TEMPLATE payload: expected object");
    }
}
