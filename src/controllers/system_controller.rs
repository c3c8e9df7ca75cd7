use axum::{extract::State, Json};

use crate::models::system::HealthStatus;
use crate::shared_state::AppState;

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let (predictions_stored, optimizations_stored) = state.counts();
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        predictions_stored,
        optimizations_stored,
        snapshot_enabled: state.storage.snapshot_path.is_some(),
    })
}
