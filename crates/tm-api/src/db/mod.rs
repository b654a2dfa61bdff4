//! # Database Persistence Layer
//!
//! Postgres persistence for licenses via SQLx.
//!
//! The database is optional. When `DATABASE_URL` is set the service keeps
//! licenses in the `licenses` table; otherwise it falls back to the
//! in-memory store and nothing survives a restart.

pub mod licenses;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub use licenses::PgLicenseStore;

/// Connect to Postgres and apply the embedded migrations.
pub async fn init_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
