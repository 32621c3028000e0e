//! CheapAlarms admin gateway
//!
//! Main entry point: tracing setup, configuration load, context wiring,
//! and the axum server with graceful shutdown.

use cheapalarms_api::{routes, AppContext};
use cheapalarms_domain::{CheapAlarmsError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env file, using process environment"),
    }

    let config = cheapalarms_infra::config::load()?;
    let bind_addr = config.server.bind_addr.clone();
    let environment = config.server.environment;

    let ctx = AppContext::new(config)?;
    let app = routes::router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| CheapAlarmsError::Internal { message: format!("bind {bind_addr}: {e}") })?;

    info!(%bind_addr, ?environment, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CheapAlarmsError::Internal { message: format!("server error: {e}") })?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler; shutting down");
    }
}
