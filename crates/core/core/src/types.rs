//! Core data types for the PushSMS SDK.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SdkError, SdkResult};

/// The app identifier and its shared secret.
///
/// Credentials are key material only: they are used to sign outbound calls
/// and to verify inbound callbacks, and are never transmitted as-is.
///
/// # Example
///
/// ```rust
/// use pushsms_core::Credentials;
///
/// let creds = Credentials::new("app-key", "master-secret");
/// assert_eq!(creds.app_key(), "app-key");
/// assert!(!format!("{creds:?}").contains("master-secret"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    app_key: String,
    app_master_secret: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(app_key: impl Into<String>, app_master_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_master_secret: app_master_secret.into(),
        }
    }

    /// Returns the app key.
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Returns the app master secret.
    pub fn app_master_secret(&self) -> &str {
        &self.app_master_secret
    }

    /// Checks that both halves of the pair are present.
    pub fn validate(&self) -> SdkResult<()> {
        if self.app_key.trim().is_empty() {
            return Err(SdkError::missing("app_key"));
        }
        if self.app_master_secret.is_empty() {
            return Err(SdkError::missing("app_master_secret"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_master_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Credentials::new("key", "secret").validate().is_ok());
        assert!(matches!(
            Credentials::new(" ", "secret").validate(),
            Err(SdkError::MissingConfiguration { key }) if key == "app_key"
        ));
        assert!(matches!(
            Credentials::new("key", "").validate(),
            Err(SdkError::MissingConfiguration { key }) if key == "app_master_secret"
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("key", "very-secret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("key"));
        assert!(!debug.contains("very-secret"));
    }
}
