//! # Application State
//!
//! Configuration and the shared state handed to every route handler via the
//! `State` extractor. The state holds the two collaborators the handlers
//! depend on, the license store and the auth verifier, as trait objects so
//! `main` and the tests can inject whichever implementation they need.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tm_core::{InMemoryLicenseStore, LicenseStore};

use crate::auth::{AuthVerifier, StaticTokenVerifier};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Application configuration, read from flags with environment fallbacks.
///
/// Custom `Debug` redacts `auth_token` and `database_url`.
#[derive(Clone, Parser)]
#[command(name = "tm-api", about = "Imagery license API server")]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Shared secret for session tokens. Authentication is disabled when unset.
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Postgres connection string. Licenses are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            database_url: None,
            log_format: LogFormat::Text,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Cheap to clone: both collaborators sit behind `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Canonical license records.
    pub licenses: Arc<dyn LicenseStore>,
    /// Session-token verification.
    pub auth: Arc<dyn AuthVerifier>,
}

impl AppState {
    /// In-memory store with authentication disabled.
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(InMemoryLicenseStore::new()),
            Arc::new(StaticTokenVerifier::disabled()),
        )
    }

    /// Build state from configuration around an already-connected store.
    pub fn with_config(config: &AppConfig, licenses: Arc<dyn LicenseStore>) -> Self {
        Self::with_parts(
            licenses,
            Arc::new(StaticTokenVerifier::new(config.auth_token.clone())),
        )
    }

    /// Build state from explicit collaborators.
    pub fn with_parts(licenses: Arc<dyn LicenseStore>, auth: Arc<dyn AuthVerifier>) -> Self {
        Self { licenses, auth }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
