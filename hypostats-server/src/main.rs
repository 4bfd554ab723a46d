use anyhow::{Context, Result};
use hypostats_api::observability::{init_logging, init_metrics, LogConfig};
use std::net::SocketAddr;

mod config;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::load().context("failed to load configuration")?;

    init_logging(&LogConfig {
        format: config.log_format,
        level: config.log_level.clone(),
        filter: None,
    })
    .context("failed to initialise logging")?;

    tracing::info!("Starting hypostats server");

    init_metrics().context("failed to install metrics exporter")?;

    let app = hypostats_api::app(state::build_state(&config)?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
