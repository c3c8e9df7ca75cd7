use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub predictions_stored: usize,
    pub optimizations_stored: usize,
    pub snapshot_enabled: bool,
}
