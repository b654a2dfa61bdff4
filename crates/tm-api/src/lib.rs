//! # tm-api - Imagery License Service
//!
//! HTTP surface for the licenses that govern use of imagery in mapping
//! projects. Anyone may read licenses; creating, updating and deleting them
//! requires a project-manager session token.
//!
//! ## API Surface
//!
//! | Route                  | Method | Auth             |
//! |------------------------|--------|------------------|
//! | `/licenses`            | GET    | none             |
//! | `/licenses`            | POST   | project manager  |
//! | `/licenses/{id}`       | GET    | none             |
//! | `/licenses/{id}`       | PATCH  | project manager  |
//! | `/licenses/{id}`       | DELETE | project manager  |
//! | `/health/liveness`     | GET    | none             |
//! | `/health/readiness`    | GET    | none             |
//! | `/openapi.json`        | GET    | none             |
//!
//! Authorization is checked per handler through the
//! [`auth::ProjectManager`] extractor rather than a blanket middleware, since
//! reads and writes share paths.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(routes::licenses::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the license store answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.licenses.ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(err) => {
            tracing::warn!(error = %err, "license store is not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "license store unavailable")
        }
    }
}
