//! visitor-counter server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use tracing_subscriber::EnvFilter;

use visitor_counter::api;
use visitor_counter::app_state::AppState;
use visitor_counter::config::{AppConfig, LogFormat};
use visitor_counter::persistence::VisitorStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting visitor-counter");

    // Build persistence and application state
    let store = VisitorStore::from_config(&config).await?;
    let app_state = AppState::new(store, &config);

    // Build router
    let app = api::build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
