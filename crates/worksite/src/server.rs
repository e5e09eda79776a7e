//! HTTP server startup and shutdown.

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api;
use crate::config::Config;
use crate::error::Result;
use crate::registry::{Registry, RegistryDefaults, SharedRegistry};

/// Build the registry described by the configuration.
///
/// # Errors
///
/// Returns an error if the demo data cannot be loaded.
pub fn build_registry(config: &Config) -> Result<SharedRegistry> {
    let defaults = RegistryDefaults::from(&config.registry);
    let registry = if config.registry.seed_demo_data {
        Registry::with_seed_data(defaults)?
    } else {
        info!("Starting with an empty registry");
        Registry::new(defaults)
    };
    Ok(registry.into_shared())
}

/// Serve the API until Ctrl-C is received.
///
/// # Errors
///
/// Returns an error if the listen address is invalid, the socket cannot be
/// bound, or the server fails while running.
pub async fn run(config: &Config) -> Result<()> {
    let registry = build_registry(config)?;
    let app = api::app(registry, &config.cors)?;

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Worksite Secure API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
