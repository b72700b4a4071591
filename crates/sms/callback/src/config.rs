//! Listener configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CallbackError, CallbackResult};

/// Address used when none is configured.
pub const DEFAULT_ADDR: &str = ":8088";
/// Path used when none is configured.
pub const DEFAULT_PATH: &str = "/callback";

/// Where the callback listener binds and which path it serves.
///
/// Missing keys fall back to the defaults; an explicitly empty value is
/// rejected by `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    /// Listen address, `host:port` or `:port` for all interfaces.
    pub addr: String,
    /// URL path the vendor posts to.
    pub path: String,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            path: DEFAULT_PATH.to_string(),
        }
    }
}

impl CallbackConfig {
    /// Checks the address and path.
    pub fn validate(&self) -> CallbackResult<()> {
        validate_addr(&self.addr)?;
        validate_path(&self.path)
    }

    /// Returns the address in a form `TcpListener::bind` accepts.
    pub fn bind_addr(&self) -> String {
        if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        }
    }
}

fn validate_addr(addr: &str) -> CallbackResult<()> {
    if addr.trim().is_empty() {
        return Err(CallbackError::config("listen address must not be empty"));
    }
    let port = addr
        .rsplit_once(':')
        .map(|(_, port)| port)
        .ok_or_else(|| CallbackError::config(format!("listen address '{addr}' has no port")))?;
    port.parse::<u16>()
        .map_err(|_| CallbackError::config(format!("invalid port in listen address '{addr}'")))?;
    Ok(())
}

fn validate_path(path: &str) -> CallbackResult<()> {
    if path.is_empty() {
        return Err(CallbackError::config("callback path must not be empty"));
    }
    if !path.starts_with('/') {
        return Err(CallbackError::config(format!(
            "callback path '{path}' must start with '/'"
        )));
    }
    if path.contains(|c: char| c.is_whitespace() || c == '{' || c == '}') {
        return Err(CallbackError::config(format!(
            "callback path '{path}' contains invalid characters"
        )));
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(CallbackError::config(format!(
            "callback path '{path}' has a segment starting with ':' or '*'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CallbackConfig::default();
        assert_eq!(config.addr, ":8088");
        assert_eq!(config.path, "/callback");
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr(), "0.0.0.0:8088");
    }

    #[test]
    fn test_explicit_addresses() {
        for addr in ["127.0.0.1:9000", "localhost:80", "[::1]:8088", ":0"] {
            let config = CallbackConfig {
                addr: addr.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{addr}");
        }
        let config = CallbackConfig {
            addr: "127.0.0.1:9000".into(),
            ..Default::default()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_addresses() {
        for addr in ["", " ", "localhost", ":http", "host:70000"] {
            let config = CallbackConfig {
                addr: addr.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(CallbackError::Configuration { .. })),
                "{addr}"
            );
        }
    }

    #[test]
    fn test_invalid_paths() {
        for path in ["", "callback", "/call back", "/{id}", "/:token", "/sms/*rest"] {
            let config = CallbackConfig {
                path: path.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{path}");
        }
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: CallbackConfig = serde_json::from_str(r#"{"path":"/sms"}"#).unwrap();
        assert_eq!(config.addr, ":8088");
        assert_eq!(config.path, "/sms");

        let config: CallbackConfig = serde_json::from_str(r#"{"addr":""}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
