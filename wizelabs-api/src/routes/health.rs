/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": {"active_connections": 1, "idle_connections": 4, "total_connections": 5}
/// }
/// ```
///
/// Always answers `200`; a failing database shows up as `"degraded"` so load
/// balancers can tell a slow dependency from a dead process.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use wizelabs_shared::db::pool::{get_pool_stats, health_check as database_health, PoolStats};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub pool: PoolStats,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match database_health(&state.db).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: if database == "connected" { "healthy" } else { "degraded" },
        version: wizelabs_shared::VERSION,
        database,
        pool: get_pool_stats(&state.db),
    })
}
