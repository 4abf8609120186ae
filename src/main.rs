use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use clausecheck::api::server;
use clausecheck::config::{self, Config};
use clausecheck::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before reading any configuration
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cfg = Config::from_env()?;
    tracing::info!(
        version = config::APP_VERSION,
        port = cfg.port,
        smtp_configured = cfg.smtp.is_some(),
        sheets_enabled = cfg.sheets.is_some(),
        "clausecheck starting"
    );

    let state = Arc::new(AppState::new(cfg));
    state.ensure_dirs()?;

    let port = state.config.port;
    let mut api = server::start(state, IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
        .await
        .map_err(std::io::Error::other)?;
    tracing::info!(addr = %api.addr, "listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    api.shutdown();

    Ok(())
}
