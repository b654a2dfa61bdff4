//! # tm-api - Binary Entry Point
//!
//! Starts the Axum HTTP server for the imagery license API.
//! Binds to a configurable port (default 8080).

use std::sync::Arc;

use clap::Parser;
use tm_api::db::PgLicenseStore;
use tm_api::state::{AppConfig, AppState, LogFormat};
use tm_core::{InMemoryLicenseStore, LicenseStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::parse();

    // Initialize structured tracing.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let licenses: Arc<dyn LicenseStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = tm_api::db::init_pool(url).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            Arc::new(PgLicenseStore::new(pool))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only mode. \
                 Licenses will not survive restarts."
            );
            Arc::new(InMemoryLicenseStore::new())
        }
    };

    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set, every caller is treated as an administrator");
    }

    let state = AppState::with_config(&config, licenses);
    let app = tm_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("License API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
