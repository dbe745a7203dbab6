//! CannXperts listing service.

use anyhow::{Context, Result};
use cannx_listings::api::rest::{self, AppState};
use cannx_listings::config::Settings;
use cannx_listings::telemetry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    telemetry::init_logging(&settings.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting listing service");

    let bind_addr = settings.bind_addr()?;
    let state = AppState::from_settings(&settings).context("Failed to build services")?;

    rest::serve(Arc::new(state), bind_addr, shutdown_signal())
        .await
        .with_context(|| format!("Failed to serve on {}", bind_addr))?;

    tracing::info!("listing service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
