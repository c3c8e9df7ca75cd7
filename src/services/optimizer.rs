use chrono::NaiveDateTime;

use crate::models::prediction::CalculationMode;
use crate::models::weather::WeatherSnapshot;
use crate::services::power_model::{predict_power, PowerFeatures};
use crate::services::solar_geometry;

/// Inclusive search ranges and steps, in degrees.
#[derive(Debug, Clone, Copy)]
pub struct SearchGrid {
    pub tilt_min: u32,
    pub tilt_max: u32,
    pub tilt_step: u32,
    pub azimuth_min: u32,
    pub azimuth_max: u32,
    pub azimuth_step: u32,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self { tilt_min: 0, tilt_max: 60, tilt_step: 5, azimuth_min: 120, azimuth_max: 240, azimuth_step: 10 }
    }
}

impl SearchGrid {
    /// Candidate (tilt, azimuth) pairs, tilt-major.
    pub fn candidates(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (self.tilt_min..=self.tilt_max)
            .step_by(self.tilt_step.max(1) as usize)
            .flat_map(move |tilt| {
                (self.azimuth_min..=self.azimuth_max)
                    .step_by(self.azimuth_step.max(1) as usize)
                    .map(move |az| (f64::from(tilt), f64::from(az)))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptimum {
    pub optimal_tilt: f64,
    pub optimal_azimuth: f64,
    pub max_power_kw: f64,
    pub current_power_kw: f64,
    pub improvement_percentage: f64,
    pub evaluations: usize,
}

pub struct OptimizeInput<'a> {
    pub latitude: f64,
    pub current_tilt: f64,
    pub current_azimuth: f64,
    pub system_capacity_kw: f64,
    pub weather: &'a WeatherSnapshot,
    pub local: NaiveDateTime,
}

fn evaluate(input: &OptimizeInput<'_>, tilt: f64, azimuth: f64) -> f64 {
    let geometry = solar_geometry::calculate(input.latitude, tilt, azimuth, input.local);
    let features = PowerFeatures::new(input.weather, geometry, input.system_capacity_kw);
    predict_power(&features, CalculationMode::Advanced)
}

/// Exhaustive search. The current angles stand unless some candidate beats
/// zero and every earlier candidate.
pub fn optimize(input: &OptimizeInput<'_>, grid: &SearchGrid) -> GridOptimum {
    let mut max_power = 0.0;
    let mut optimal_tilt = input.current_tilt;
    let mut optimal_azimuth = input.current_azimuth;
    let mut evaluations = 0;

    for (tilt, azimuth) in grid.candidates() {
        evaluations += 1;
        let power = evaluate(input, tilt, azimuth);
        if power > max_power {
            max_power = power;
            optimal_tilt = tilt;
            optimal_azimuth = azimuth;
        }
    }

    let current_power = evaluate(input, input.current_tilt, input.current_azimuth);
    let improvement_percentage = if current_power > 0.0 {
        (max_power - current_power) / current_power * 100.0
    } else {
        0.0
    };

    GridOptimum {
        optimal_tilt,
        optimal_azimuth,
        max_power_kw: max_power,
        current_power_kw: current_power,
        improvement_percentage,
        evaluations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn weather(irradiance: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: Some(20.0),
            humidity: Some(40.0),
            pressure: Some(1013.0),
            wind_speed: Some(2.0),
            cloud_cover: 10.0,
            solar_irradiance: irradiance,
            timestamp: "2025-06-21T12:00".into(),
            utc_offset_seconds: 0,
        }
    }

    fn noon(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn default_grid_has_169_candidates() {
        let grid = SearchGrid::default();
        let all: Vec<_> = grid.candidates().collect();
        assert_eq!(all.len(), 13 * 13);
        assert_eq!(all.first(), Some(&(0.0, 120.0)));
        assert_eq!(all.last(), Some(&(60.0, 240.0)));
    }

    #[test]
    fn noon_optimum_faces_south() {
        let w = weather(800.0);
        let input = OptimizeInput {
            latitude: 45.0,
            current_tilt: 0.0,
            current_azimuth: 90.0,
            system_capacity_kw: 5.0,
            weather: &w,
            local: noon(3, 22),
        };
        let best = optimize(&input, &SearchGrid::default());
        assert_eq!(best.optimal_azimuth, 180.0);
        assert_eq!(best.optimal_tilt, 45.0);
        assert_eq!(best.evaluations, 169);
        assert!(best.max_power_kw >= best.current_power_kw);
        assert!(best.improvement_percentage > 0.0);
    }

    #[test]
    fn dark_sky_keeps_current_angles() {
        let w = weather(0.0);
        let input = OptimizeInput {
            latitude: 45.0,
            current_tilt: 33.0,
            current_azimuth: 170.0,
            system_capacity_kw: 5.0,
            weather: &w,
            local: noon(6, 21),
        };
        let best = optimize(&input, &SearchGrid::default());
        assert_eq!((best.optimal_tilt, best.optimal_azimuth), (33.0, 170.0));
        assert_eq!(best.max_power_kw, 0.0);
        assert_eq!(best.improvement_percentage, 0.0);
    }

    #[test]
    fn ties_keep_first_candidate() {
        // Equator at equinox noon: the sun is overhead, so every azimuth on a
        // flat panel scores the same and the first one is kept.
        let w = weather(900.0);
        let input = OptimizeInput {
            latitude: 0.0,
            current_tilt: 10.0,
            current_azimuth: 180.0,
            system_capacity_kw: 5.0,
            weather: &w,
            local: noon(3, 22),
        };
        let best = optimize(&input, &SearchGrid::default());
        assert_eq!((best.optimal_tilt, best.optimal_azimuth), (0.0, 120.0));
    }
}
