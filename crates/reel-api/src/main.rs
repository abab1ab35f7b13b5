//! # reel-api -- Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to a configurable port (default 8080).

use std::net::SocketAddr;
use std::sync::Arc;

use reel_api::mailer::LogMailer;
use reel_api::state::{AppConfig, AppState};
use reel_catalog::{CatalogClient, CatalogConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {e}");
        e
    })?;
    let port = config.port;

    if config.google.is_none() {
        tracing::warn!("Google OAuth not configured. Social sign-in will return 503.");
    }

    let catalog = match CatalogConfig::from_env() {
        Ok(catalog_config) => {
            tracing::info!(base_url = %catalog_config.base_url, "movie catalog configured");
            Some(CatalogClient::new(catalog_config).map_err(|e| {
                tracing::error!("Failed to create catalog client: {e}");
                e
            })?)
        }
        Err(e) => {
            tracing::warn!("Movie catalog not configured: {e}. Movie endpoints will return 503.");
            None
        }
    };

    let state = AppState::with_config(config, catalog, Arc::new(LogMailer));
    let app = reel_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Reel API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
