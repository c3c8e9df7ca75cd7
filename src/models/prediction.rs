use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::weather::WeatherSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalculationMode {
    /// Irradiance times capacity, no derates.
    Simple,
    #[default]
    Advanced,
}

impl CalculationMode {
    /// `"simple"` selects the baseline model; any other label falls back to advanced.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("simple") => CalculationMode::Simple,
            _ => CalculationMode::Advanced,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub tilt: f64,
    pub azimuth: f64,
    pub system_capacity_kw: f64,
    /// `simple` or `advanced` (default).
    #[serde(default)]
    pub calculation_mode: Option<String>,
    /// Multiplier applied to the raw prediction; negative values clamp to 0.
    #[serde(default)]
    pub calibration_factor: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub cloud_cover: f64,
    pub wind_speed: f64,
    pub solar_irradiance: f64,
}

impl TryFrom<&WeatherSnapshot> for WeatherData {
    type Error = AppError;

    fn try_from(w: &WeatherSnapshot) -> Result<Self, Self::Error> {
        Ok(Self {
            temperature: w.temperature.ok_or(AppError::IncompleteWeather("temperature"))?,
            humidity: w.humidity.ok_or(AppError::IncompleteWeather("humidity"))?,
            pressure: w.pressure.ok_or(AppError::IncompleteWeather("pressure"))?,
            cloud_cover: w.cloud_cover,
            wind_speed: w.wind_speed.ok_or(AppError::IncompleteWeather("wind speed"))?,
            solar_irradiance: w.solar_irradiance,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarGeometry {
    /// Degrees from vertical.
    pub zenith: f64,
    /// Degrees between the sun and the panel normal.
    pub angle_of_incidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub tilt: f64,
    pub azimuth: f64,
    pub system_capacity_kw: f64,
    pub predicted_power_kw: f64,
    pub timestamp: String,
    pub weather_data: WeatherData,
    pub solar_geometry: SolarGeometry,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub prediction_id: Uuid,
    pub predicted_power_kw: f64,
    pub timestamp: String,
    pub weather_data: WeatherData,
    pub solar_geometry: SolarGeometry,
}

impl From<&PredictionRecord> for PredictionResponse {
    fn from(r: &PredictionRecord) -> Self {
        Self {
            prediction_id: r.id,
            predicted_power_kw: r.predicted_power_kw,
            timestamp: r.timestamp.clone(),
            weather_data: r.weather_data,
            solar_geometry: r.solar_geometry,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum number of records; missing or 0 selects the default.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ClearResponse {
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_simple_label_selects_simple() {
        assert_eq!(CalculationMode::from_label(Some("simple")), CalculationMode::Simple);
        assert_eq!(CalculationMode::from_label(Some("advanced")), CalculationMode::Advanced);
        assert_eq!(CalculationMode::from_label(Some("foo")), CalculationMode::Advanced);
        assert_eq!(CalculationMode::from_label(Some("Simple")), CalculationMode::Advanced);
        assert_eq!(CalculationMode::from_label(None), CalculationMode::Advanced);
    }
}
