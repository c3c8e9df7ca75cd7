use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub current_tilt: f64,
    pub current_azimuth: f64,
    pub system_capacity_kw: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecord {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub optimal_tilt: f64,
    pub optimal_azimuth: f64,
    pub max_power_kw: f64,
    pub current_tilt: f64,
    pub current_azimuth: f64,
    pub current_power_kw: f64,
    pub improvement_percentage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResponse {
    pub optimization_id: Uuid,
    pub optimal_tilt: f64,
    pub optimal_azimuth: f64,
    pub max_power_kw: f64,
    pub current_power_kw: f64,
    pub improvement_percentage: f64,
}

impl From<&OptimizationRecord> for OptimizationResponse {
    fn from(r: &OptimizationRecord) -> Self {
        Self {
            optimization_id: r.id,
            optimal_tilt: r.optimal_tilt,
            optimal_azimuth: r.optimal_azimuth,
            max_power_kw: r.max_power_kw,
            current_power_kw: r.current_power_kw,
            improvement_percentage: r.improvement_percentage,
        }
    }
}
