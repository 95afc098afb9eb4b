use axum::extract::State;
use axum::{routing::get, Json, Router};
use moviechars_db::CatalogCounts;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Catalog sizes; absent when the database cannot be queried.
    pub catalog: Option<CatalogCounts>,
}

/// GET /health -- returns service and database health plus catalog sizes.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = moviechars_db::health_check(&state.pool).await.is_ok();

    let catalog = if db_healthy {
        match moviechars_db::catalog_counts(&state.pool).await {
            Ok(counts) => Some(counts),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to count catalog rows");
                None
            }
        }
    } else {
        None
    };

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        catalog,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
