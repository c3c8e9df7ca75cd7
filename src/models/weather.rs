use serde::Deserialize;

// ─── Open-Meteo wire types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ForecastResponse {
    #[serde(default)]
    pub utc_offset_seconds: Option<i32>,
    #[serde(default)]
    pub current: Option<CurrentBlock>,
    #[serde(default)]
    pub hourly: Option<HourlyBlock>,
}

/// Subset of the `current` block the model reads. Other requested fields are ignored.
#[derive(Debug, Deserialize, Default)]
pub struct CurrentBlock {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub cloudcover: Option<f64>,
    pub shortwave_radiation: Option<f64>,
    pub windspeed_10m: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HourlyBlock {
    pub time: Option<Vec<String>>,
    pub shortwave_radiation: Option<Vec<Option<f64>>>,
    pub cloudcover: Option<Vec<Option<f64>>>,
}

// ─── Normalized conditions ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    /// Percent, 0 when unknown.
    pub cloud_cover: f64,
    /// W/m², 0 when unknown.
    pub solar_irradiance: f64,
    /// Location-local time of the conditions used.
    pub timestamp: String,
    pub utc_offset_seconds: i32,
}
