//! Health check handler
//!
//! Liveness endpoint that also pings both storage dependencies.

use axum::{extract::State, http::StatusCode, Json};
use keygate_service::dto::HealthResponse;

use crate::state::AppState;

/// Health check with dependency probes
///
/// GET /health
///
/// Reports 200 while both PostgreSQL and Redis answer, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = state.db_pool().acquire().await.is_ok();
    let redis_up = state.redis_pool().health_check().await.is_ok();

    let status = if database_up && redis_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(HealthResponse::new(database_up, redis_up)))
}
