//! # PushSMS Callback Server
//!
//! Runs a callback listener configured from a TOML file, with every
//! notification kind handled by the logging processor unless disabled.

mod config;

pub use config::{
    AppConfig, ConfigError, CredentialsConfig, ProcessorsConfig, SECRET_ENV_VAR, ServerConfig,
    load_config, parse_config,
};

use pushsms_callback::{CallbackError, CallbackServer};
use std::future::Future;

/// Error starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Callback(#[from] CallbackError),
}

/// Builds a callback server from configuration.
///
/// `env_secret` is the value of `PUSHSMS_APP_MASTER_SECRET`, if set.
pub fn build_server(
    config: &AppConfig,
    env_secret: Option<String>,
) -> Result<CallbackServer, ServerError> {
    let credentials = config.resolve_credentials(env_secret)?;
    let mut builder = CallbackServer::builder(credentials)
        .config(config.callback_config())
        .logger(tracing::info_span!("pushsms_callback_server"));

    for kind in config.disabled_kinds()? {
        builder = builder.disable(kind);
    }

    Ok(builder.build()?)
}

/// Builds the server and runs it until `shutdown` resolves.
pub async fn run<F>(
    config: &AppConfig,
    env_secret: Option<String>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let server = build_server(config, env_secret)?;
    tracing::info!(
        addr = %config.server.addr,
        path = %config.server.path,
        disabled = ?config.processors.disabled,
        "Starting PushSMS callback server"
    );
    server.run_until(shutdown).await?;
    Ok(())
}
