use crate::models::prediction::{CalculationMode, SolarGeometry};
use crate::models::weather::WeatherSnapshot;

const DEFAULT_CAPACITY_KW: f64 = 5.0;
const STC_IRRADIANCE_W_M2: f64 = 1000.0;
const TEMP_COEFFICIENT: f64 = 0.004;
const MIN_TEMP_FACTOR: f64 = 0.5;
const CLOUD_LOSS: f64 = 0.8;
const HUMIDITY_LOSS: f64 = 0.1;

/// Inputs to the output model. Missing readings fall back to neutral defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerFeatures {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub solar_irradiance: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub zenith: Option<f64>,
    pub angle_of_incidence: Option<f64>,
    pub system_capacity_kw: Option<f64>,
}

impl PowerFeatures {
    pub fn new(weather: &WeatherSnapshot, geometry: SolarGeometry, system_capacity_kw: f64) -> Self {
        Self {
            temperature: weather.temperature,
            humidity: weather.humidity,
            solar_irradiance: Some(weather.solar_irradiance),
            cloud_cover: Some(weather.cloud_cover),
            zenith: Some(geometry.zenith),
            angle_of_incidence: Some(geometry.angle_of_incidence),
            system_capacity_kw: Some(system_capacity_kw),
        }
    }
}

/// Estimated DC output in kW, never negative.
pub fn predict_power(f: &PowerFeatures, mode: CalculationMode) -> f64 {
    let irradiance = f.solar_irradiance.unwrap_or(0.0);
    let capacity = f.system_capacity_kw.unwrap_or(DEFAULT_CAPACITY_KW);
    let mut power = irradiance / STC_IRRADIANCE_W_M2 * capacity;

    if mode == CalculationMode::Simple {
        return power.max(0.0);
    }

    let temp = f.temperature.unwrap_or(25.0);
    power *= (1.0 - (temp - 25.0) * TEMP_COEFFICIENT).max(MIN_TEMP_FACTOR);

    power *= 1.0 - f.cloud_cover.unwrap_or(0.0) / 100.0 * CLOUD_LOSS;

    let incidence = f.angle_of_incidence.unwrap_or(90.0);
    power *= incidence.to_radians().cos().max(0.0);

    // Low sun
    let zenith = f.zenith.unwrap_or(90.0);
    if zenith > 85.0 {
        power *= 0.1;
    } else if zenith > 70.0 {
        power *= 0.5;
    }

    power *= 1.0 - f.humidity.unwrap_or(0.0) / 100.0 * HUMIDITY_LOSS;

    power.max(0.0)
}

/// Finite factors clamp at zero; anything else means no calibration.
pub fn calibration_factor(raw: Option<f64>) -> f64 {
    match raw {
        Some(f) if f.is_finite() => f.max(0.0),
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideal() -> PowerFeatures {
        PowerFeatures {
            temperature: Some(25.0),
            humidity: Some(0.0),
            solar_irradiance: Some(800.0),
            cloud_cover: Some(0.0),
            zenith: Some(30.0),
            angle_of_incidence: Some(0.0),
            system_capacity_kw: Some(10.0),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn simple_mode_ignores_derates() {
        let f = PowerFeatures { cloud_cover: Some(100.0), angle_of_incidence: Some(89.0), ..ideal() };
        assert!(close(predict_power(&f, CalculationMode::Simple), 8.0));
    }

    #[test]
    fn advanced_mode_ideal_conditions_match_simple() {
        assert!(close(predict_power(&ideal(), CalculationMode::Advanced), 8.0));
    }

    #[test]
    fn derates_multiply() {
        let f = PowerFeatures {
            temperature: Some(35.0),
            cloud_cover: Some(50.0),
            humidity: Some(50.0),
            angle_of_incidence: Some(60.0),
            zenith: Some(75.0),
            ..ideal()
        };
        let expected = 8.0 * 0.96 * 0.6 * 0.5 * 0.5 * 0.95;
        assert!(close(predict_power(&f, CalculationMode::Advanced), expected));
    }

    #[test]
    fn temperature_factor_floors_at_half() {
        let f = PowerFeatures { temperature: Some(400.0), ..ideal() };
        assert!(close(predict_power(&f, CalculationMode::Advanced), 4.0));
    }

    #[test]
    fn sun_near_horizon_is_cut_to_a_tenth() {
        let f = PowerFeatures { zenith: Some(86.0), ..ideal() };
        assert!(close(predict_power(&f, CalculationMode::Advanced), 0.8));
    }

    #[test]
    fn panel_facing_away_produces_nothing() {
        let f = PowerFeatures { angle_of_incidence: Some(120.0), ..ideal() };
        assert_eq!(predict_power(&f, CalculationMode::Advanced), 0.0);
    }

    #[test]
    fn missing_features_use_defaults() {
        // Irradiance defaults to 0, so output is 0 regardless of the rest.
        assert_eq!(predict_power(&PowerFeatures::default(), CalculationMode::Simple), 0.0);
        // Capacity defaults to 5 kW.
        let f = PowerFeatures { solar_irradiance: Some(1000.0), ..PowerFeatures::default() };
        assert!(close(predict_power(&f, CalculationMode::Simple), 5.0));
        // Incidence and zenith default to 90°, which zeroes advanced output.
        assert!(predict_power(&f, CalculationMode::Advanced) < 1e-12);
    }

    #[test]
    fn negative_irradiance_clamps_to_zero() {
        let f = PowerFeatures { solar_irradiance: Some(-50.0), ..ideal() };
        assert_eq!(predict_power(&f, CalculationMode::Simple), 0.0);
    }

    #[test]
    fn calibration_factor_rules() {
        assert_eq!(calibration_factor(None), 1.0);
        assert_eq!(calibration_factor(Some(f64::NAN)), 1.0);
        assert_eq!(calibration_factor(Some(f64::INFINITY)), 1.0);
        assert_eq!(calibration_factor(Some(-2.0)), 0.0);
        assert_eq!(calibration_factor(Some(1.25)), 1.25);
    }
}
