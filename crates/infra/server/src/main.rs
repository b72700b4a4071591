//! PushSMS callback server binary.

use clap::Parser;
use pushsms_server::{SECRET_ENV_VAR, load_config, run};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pushsms-callback-server", about = "Receives PushSMS inbound notifications")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "pushsms.toml")]
    config: PathBuf,

    /// Listen address (overrides config)
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(addr) = cli.addr {
        config.server.addr = addr;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let env_secret = std::env::var(SECRET_ENV_VAR).ok();
    run(&config, env_secret, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
        }
    })
    .await?;

    Ok(())
}
