/// Nail Atelier - booking backend for a nail salon
///
/// Accounts, a bookable service catalog, guest and authenticated
/// appointment bookings, and business availability configuration.

mod account;
mod api;
mod auth;
mod availability;
mod booking;
mod catalog;
mod config;
mod context;
mod db;
mod error;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nail_atelier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;

    tracing::info!("Nail Atelier v{}", config.service.version);

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
