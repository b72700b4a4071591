//! Server configuration.

use pushsms_callback::{CallbackConfig, DEFAULT_ADDR, DEFAULT_PATH, NotificationKind};
use pushsms_core::Credentials;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that supplies the master secret.
pub const SECRET_ENV_VAR: &str = "PUSHSMS_APP_MASTER_SECRET";

/// Listener and logging settings (`[server]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: String,
    /// Callback path.
    pub path: String,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            path: DEFAULT_PATH.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Application credentials (`[credentials]`).
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub app_key: String,
    /// May be left out and supplied through `PUSHSMS_APP_MASTER_SECRET`.
    pub app_master_secret: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("app_key", &self.app_key)
            .field(
                "app_master_secret",
                &self.app_master_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Processor settings (`[processors]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorsConfig {
    /// Type tags (e.g. `SMS_SIGN`) accepted without logging the payload.
    pub disabled: Vec<String>,
}

/// Complete configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub credentials: CredentialsConfig,
    pub processors: ProcessorsConfig,
}

impl AppConfig {
    /// Returns the listener settings.
    pub fn callback_config(&self) -> CallbackConfig {
        CallbackConfig {
            addr: self.server.addr.clone(),
            path: self.server.path.clone(),
        }
    }

    /// Resolves credentials, preferring a non-empty `env_secret` over the file.
    pub fn resolve_credentials(
        &self,
        env_secret: Option<String>,
    ) -> Result<Credentials, ConfigError> {
        if self.credentials.app_key.is_empty() {
            return Err(ConfigError::Missing("credentials.app_key".into()));
        }
        let secret = env_secret
            .filter(|s| !s.is_empty())
            .or_else(|| self.credentials.app_master_secret.clone())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ConfigError::Missing(format!(
                    "credentials.app_master_secret (or {SECRET_ENV_VAR})"
                ))
            })?;
        Ok(Credentials::new(self.credentials.app_key.clone(), secret))
    }

    /// Parses the disabled type tags.
    pub fn disabled_kinds(&self) -> Result<Vec<NotificationKind>, ConfigError> {
        self.processors
            .disabled
            .iter()
            .map(|tag| {
                tag.parse::<NotificationKind>()
                    .map_err(|e| ConfigError::Invalid(format!("processors.disabled: {e}")))
            })
            .collect()
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Loads configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;
    parse_config(&content)
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Missing configuration: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[server]
addr = "127.0.0.1:9000"
path = "/sms/callback"
log_level = "debug"

[credentials]
app_key = "key"
app_master_secret = "file-secret"

[processors]
disabled = ["SMS_TEMPLATE", "SMS_SIGN"]
"#;

    #[test]
    fn test_default_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.addr, ":8088");
        assert_eq!(config.server.path, "/callback");
        assert_eq!(config.server.log_level, "info");
        assert!(config.processors.disabled.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(config.callback_config().addr, "127.0.0.1:9000");
        assert_eq!(config.callback_config().path, "/sms/callback");
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(
            config.disabled_kinds().unwrap(),
            vec![NotificationKind::TemplateAudit, NotificationKind::SignatureAudit]
        );

        let credentials = config.resolve_credentials(None).unwrap();
        assert_eq!(credentials.app_key(), "key");
        assert_eq!(credentials.app_master_secret(), "file-secret");
    }

    #[test]
    fn test_env_secret_wins() {
        let config = parse_config(FULL).unwrap();
        let credentials = config.resolve_credentials(Some("env-secret".into())).unwrap();
        assert_eq!(credentials.app_master_secret(), "env-secret");

        let credentials = config.resolve_credentials(Some(String::new())).unwrap();
        assert_eq!(credentials.app_master_secret(), "file-secret");
    }

    #[test]
    fn test_missing_credentials() {
        let config = parse_config("[credentials]\napp_key = \"key\"\n").unwrap();
        assert!(matches!(
            config.resolve_credentials(None),
            Err(ConfigError::Missing(_))
        ));
        assert!(config.resolve_credentials(Some("s".into())).is_ok());

        let config = parse_config("").unwrap();
        assert!(matches!(
            config.resolve_credentials(Some("s".into())),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_unknown_disabled_tag() {
        let config = parse_config("[processors]\ndisabled = [\"SMS_OTHER\"]\n").unwrap();
        assert!(matches!(config.disabled_kinds(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("[server\naddr ="),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            load_config("/nonexistent/pushsms.toml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = parse_config(FULL).unwrap();
        let debug = format!("{:?}", config.credentials);
        assert!(!debug.contains("file-secret"));
    }
}
