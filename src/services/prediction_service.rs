use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::optimization::{OptimizationRecord, OptimizationRequest};
use crate::models::prediction::{CalculationMode, PredictionRecord, PredictionRequest, WeatherData};
use crate::services::optimizer::{self, OptimizeInput, SearchGrid};
use crate::services::power_model::{calibration_factor, predict_power, PowerFeatures};
use crate::services::solar_geometry;
use crate::shared_state::AppState;

pub const PREDICTION_FAILED: &str = "Failed to predict solar power output";
pub const OPTIMIZATION_FAILED: &str = "Failed to optimize panel configuration";

fn require_finite(name: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("{name} must be a finite number")))
    }
}

fn validate_site(latitude: f64, longitude: f64, system_capacity_kw: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::InvalidInput(format!("latitude {latitude} out of range [-90, 90]")));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::InvalidInput(format!("longitude {longitude} out of range [-180, 180]")));
    }
    require_finite("systemCapacityKw", system_capacity_kw)?;
    if system_capacity_kw < 0.0 {
        return Err(AppError::InvalidInput("systemCapacityKw must not be negative".into()));
    }
    Ok(())
}

/// Fetches weather for the site, runs the model and stores the result.
pub async fn predict(
    state: &AppState,
    user_id: Option<String>,
    req: PredictionRequest,
    now: DateTime<Utc>,
) -> Result<PredictionRecord, AppError> {
    validate_site(req.latitude, req.longitude, req.system_capacity_kw)?;
    require_finite("tilt", req.tilt)?;
    require_finite("azimuth", req.azimuth)?;

    run_prediction(state, user_id, req, now).await.map_err(|e| {
        error!(error = %e, "solar prediction failed");
        e.generalize(PREDICTION_FAILED)
    })
}

async fn run_prediction(
    state: &AppState,
    user_id: Option<String>,
    req: PredictionRequest,
    now: DateTime<Utc>,
) -> Result<PredictionRecord, AppError> {
    let weather = state.weather.current(req.latitude, req.longitude).await?;
    let local = solar_geometry::local_time(now, weather.utc_offset_seconds);
    let geometry = solar_geometry::calculate(req.latitude, req.tilt, req.azimuth, local);

    let mode = CalculationMode::from_label(req.calculation_mode.as_deref());
    let features = PowerFeatures::new(&weather, geometry, req.system_capacity_kw);
    let predicted_power_kw = predict_power(&features, mode) * calibration_factor(req.calibration_factor);

    let record = PredictionRecord {
        id: Uuid::new_v4(),
        user_id,
        created_at: now,
        latitude: req.latitude,
        longitude: req.longitude,
        tilt: req.tilt,
        azimuth: req.azimuth,
        system_capacity_kw: req.system_capacity_kw,
        predicted_power_kw,
        timestamp: weather.timestamp.clone(),
        weather_data: WeatherData::try_from(&weather)?,
        solar_geometry: geometry,
    };
    state.insert_prediction(record.clone()).await?;

    info!(
        prediction_id = %record.id,
        power_kw = record.predicted_power_kw,
        irradiance = weather.solar_irradiance,
        ?mode,
        "prediction stored"
    );
    Ok(record)
}

/// Grid-searches tilt and azimuth for the site and stores the suggestion.
pub async fn optimize(
    state: &AppState,
    user_id: Option<String>,
    req: OptimizationRequest,
    now: DateTime<Utc>,
) -> Result<OptimizationRecord, AppError> {
    validate_site(req.latitude, req.longitude, req.system_capacity_kw)?;
    require_finite("currentTilt", req.current_tilt)?;
    require_finite("currentAzimuth", req.current_azimuth)?;

    run_optimization(state, user_id, req, now).await.map_err(|e| {
        error!(error = %e, "panel optimization failed");
        e.generalize(OPTIMIZATION_FAILED)
    })
}

async fn run_optimization(
    state: &AppState,
    user_id: Option<String>,
    req: OptimizationRequest,
    now: DateTime<Utc>,
) -> Result<OptimizationRecord, AppError> {
    let weather = state.weather.current(req.latitude, req.longitude).await?;
    let input = OptimizeInput {
        latitude: req.latitude,
        current_tilt: req.current_tilt,
        current_azimuth: req.current_azimuth,
        system_capacity_kw: req.system_capacity_kw,
        weather: &weather,
        local: solar_geometry::local_time(now, weather.utc_offset_seconds),
    };
    let best = optimizer::optimize(&input, &SearchGrid::default());

    let record = OptimizationRecord {
        id: Uuid::new_v4(),
        user_id,
        created_at: now,
        latitude: req.latitude,
        longitude: req.longitude,
        optimal_tilt: best.optimal_tilt,
        optimal_azimuth: best.optimal_azimuth,
        max_power_kw: best.max_power_kw,
        current_tilt: req.current_tilt,
        current_azimuth: req.current_azimuth,
        current_power_kw: best.current_power_kw,
        improvement_percentage: best.improvement_percentage,
    };
    state.insert_optimization(record.clone()).await?;

    info!(
        optimization_id = %record.id,
        tilt = record.optimal_tilt,
        azimuth = record.optimal_azimuth,
        improvement_pct = record.improvement_percentage,
        evaluations = best.evaluations,
        "optimization stored"
    );
    Ok(record)
}
