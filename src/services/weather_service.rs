use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::config::WeatherConfig;
use crate::error::AppError;
use crate::models::weather::{ForecastResponse, WeatherSnapshot};

const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "surface_pressure",
    "precipitation",
    "snowfall",
    "cloudcover",
    "cloudcover_high",
    "cloudcover_mid",
    "cloudcover_low",
    "shortwave_radiation",
    "windspeed_10m",
    "winddirection_10m",
    "windspeed_80m",
    "winddirection_80m",
];

const HOURLY_FIELDS: &[&str] = &["shortwave_radiation", "cloudcover"];

/// Hours scanned for daylight irradiance when the current reading is dark.
const LOOKAHEAD_HOURS: usize = 24;

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, AppError>;
}

/// Open-Meteo forecast client
pub struct OpenMeteoClient {
    http: reqwest::Client,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(cfg: &WeatherConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_s))
            .build()?;
        Ok(Self {
            http,
            forecast_url: format!("{}/v1/forecast", cfg.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, AppError> {
        let current = CURRENT_FIELDS.join(",");
        let hourly = HOURLY_FIELDS.join(",");
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", current),
            ("hourly", hourly),
            ("timezone", "auto".to_string()),
        ];

        let resp = self
            .http
            .get(&self.forecast_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json::<ForecastResponse>()
            .await?;

        let snapshot = normalize(&resp);
        debug!(
            latitude,
            longitude,
            irradiance = snapshot.solar_irradiance,
            timestamp = %snapshot.timestamp,
            "weather fetched"
        );
        Ok(snapshot)
    }
}

/// Flattens a forecast into the conditions the power model needs.
///
/// When the current irradiance is missing or not positive (night), the
/// brightest hour within the next day is used instead, together with its
/// timestamp and cloud cover.
pub fn normalize(resp: &ForecastResponse) -> WeatherSnapshot {
    let current = resp.current.as_ref();
    let current_time = current.and_then(|c| c.time.clone());

    let mut irradiance = current.and_then(|c| c.shortwave_radiation);
    let mut timestamp = current_time.clone();
    let mut cloud_cover = current.and_then(|c| c.cloudcover);

    if irradiance.is_none_or(|g| g <= 0.0) {
        if let Some(peak) = daylight_peak(resp, current_time.as_deref()) {
            irradiance = Some(peak.irradiance);
            timestamp = Some(peak.time);
            if let Some(cc) = peak.cloud_cover {
                cloud_cover = Some(cc);
            }
        }
    }

    WeatherSnapshot {
        temperature: current.and_then(|c| c.temperature_2m),
        humidity: current.and_then(|c| c.relative_humidity_2m),
        pressure: current.and_then(|c| c.surface_pressure),
        wind_speed: current.and_then(|c| c.windspeed_10m),
        cloud_cover: cloud_cover.unwrap_or(0.0),
        solar_irradiance: irradiance.unwrap_or(0.0),
        timestamp: timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
        utc_offset_seconds: resp.utc_offset_seconds.unwrap_or(0),
    }
}

struct HourlyPeak {
    irradiance: f64,
    time: String,
    cloud_cover: Option<f64>,
}

fn daylight_peak(resp: &ForecastResponse, current_time: Option<&str>) -> Option<HourlyPeak> {
    let hourly = resp.hourly.as_ref()?;
    let times = hourly.time.as_ref()?;
    let radiation = hourly.shortwave_radiation.as_ref()?;
    if radiation.is_empty() || radiation.len() != times.len() {
        return None;
    }

    let start = current_time
        .and_then(|now| times.iter().position(|t| t == now))
        .unwrap_or(0);
    let end = radiation.len().min(start + LOOKAHEAD_HOURS);

    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in radiation.iter().enumerate().take(end).skip(start) {
        if let Some(g) = value {
            if best.is_none_or(|(_, max)| *g > max) {
                best = Some((idx, *g));
            }
        }
    }

    let (idx, max) = best?;
    if !max.is_finite() || max <= 0.0 {
        return None;
    }
    let cloud_cover = hourly
        .cloudcover
        .as_ref()
        .and_then(|cc| cc.get(idx).copied().flatten());
    Some(HourlyPeak { irradiance: max, time: times[idx].clone(), cloud_cover })
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Returns the same snapshot for every site.
    pub struct FixedWeather(pub WeatherSnapshot);

    impl FixedWeather {
        pub fn sunny() -> Self {
            Self(WeatherSnapshot {
                temperature: Some(24.0),
                humidity: Some(45.0),
                pressure: Some(1012.0),
                wind_speed: Some(3.5),
                cloud_cover: 10.0,
                solar_irradiance: 850.0,
                timestamp: "2025-06-21T12:00".to_string(),
                utc_offset_seconds: 7200,
            })
        }
    }

    #[async_trait]
    impl WeatherSource for FixedWeather {
        async fn current(&self, _latitude: f64, _longitude: f64) -> Result<WeatherSnapshot, AppError> {
            Ok(self.0.clone())
        }
    }

    /// Sunny conditions, counting how often they are requested.
    pub struct CountingWeather {
        inner: FixedWeather,
        pub calls: std::sync::atomic::AtomicUsize,
    }

    impl CountingWeather {
        pub fn sunny() -> Self {
            Self { inner: FixedWeather::sunny(), calls: std::sync::atomic::AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherSource for CountingWeather {
        async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot, AppError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.current(latitude, longitude).await
        }
    }

    pub struct FailingWeather;

    #[async_trait]
    impl WeatherSource for FailingWeather {
        async fn current(&self, _latitude: f64, _longitude: f64) -> Result<WeatherSnapshot, AppError> {
            Err(AppError::IncompleteWeather("current block"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::{CurrentBlock, HourlyBlock};

    fn hours(n: usize) -> Vec<String> {
        (0..n).map(|h| format!("2025-06-{:02}T{:02}:00", 21 + h / 24, h % 24)).collect()
    }

    fn forecast(current_g: Option<f64>, now_idx: usize, swr: Vec<Option<f64>>) -> ForecastResponse {
        let times = hours(swr.len());
        let cc = (0..swr.len()).map(|i| Some(i as f64)).collect();
        ForecastResponse {
            utc_offset_seconds: Some(7200),
            current: Some(CurrentBlock {
                time: times.get(now_idx).cloned(),
                temperature_2m: Some(18.0),
                relative_humidity_2m: Some(60.0),
                surface_pressure: Some(1010.0),
                cloudcover: Some(75.0),
                shortwave_radiation: current_g,
                windspeed_10m: Some(3.0),
            }),
            hourly: Some(HourlyBlock { time: Some(times), shortwave_radiation: Some(swr), cloudcover: Some(cc) }),
        }
    }

    #[test]
    fn daytime_reading_is_kept() {
        let resp = forecast(Some(640.0), 12, vec![Some(900.0); 48]);
        let w = normalize(&resp);
        assert_eq!(w.solar_irradiance, 640.0);
        assert_eq!(w.cloud_cover, 75.0);
        assert_eq!(w.timestamp, "2025-06-21T12:00");
        assert_eq!(w.utc_offset_seconds, 7200);
    }

    #[test]
    fn night_uses_brightest_hour_ahead() {
        let mut swr = vec![Some(0.0); 48];
        swr[30] = Some(700.0);
        swr[33] = Some(810.0);
        // Outside the 24h window starting at hour 22.
        swr[47] = Some(990.0);
        let w = normalize(&forecast(Some(0.0), 22, swr));
        assert_eq!(w.solar_irradiance, 810.0);
        assert_eq!(w.timestamp, "2025-06-22T09:00");
        assert_eq!(w.cloud_cover, 33.0);
    }

    #[test]
    fn first_maximum_wins_and_nulls_are_skipped() {
        let mut swr = vec![None; 24];
        swr[5] = Some(300.0);
        swr[9] = Some(300.0);
        let w = normalize(&forecast(None, 0, swr));
        assert_eq!(w.solar_irradiance, 300.0);
        assert_eq!(w.timestamp, "2025-06-21T05:00");
    }

    #[test]
    fn unknown_current_time_scans_from_start() {
        let mut resp = forecast(Some(0.0), 0, {
            let mut v = vec![Some(0.0); 30];
            v[2] = Some(150.0);
            v[26] = Some(900.0);
            v
        });
        resp.current.as_mut().unwrap().time = Some("1999-01-01T00:00".into());
        let w = normalize(&resp);
        assert_eq!(w.solar_irradiance, 150.0);
        assert_eq!(w.timestamp, "2025-06-21T02:00");
    }

    #[test]
    fn dark_window_keeps_zero_and_current_values() {
        let w = normalize(&forecast(Some(0.0), 0, vec![Some(0.0); 24]));
        assert_eq!(w.solar_irradiance, 0.0);
        assert_eq!(w.cloud_cover, 75.0);
        assert_eq!(w.timestamp, "2025-06-21T00:00");
    }

    #[test]
    fn mismatched_hourly_lengths_disable_fallback() {
        let mut resp = forecast(Some(0.0), 0, vec![Some(500.0); 24]);
        resp.hourly.as_mut().unwrap().time.as_mut().unwrap().pop();
        assert_eq!(normalize(&resp).solar_irradiance, 0.0);
    }

    #[test]
    fn empty_response_gets_defaults() {
        let w = normalize(&ForecastResponse::default());
        assert_eq!(w.solar_irradiance, 0.0);
        assert_eq!(w.cloud_cover, 0.0);
        assert!(w.temperature.is_none());
        assert!(!w.timestamp.is_empty());
    }
}
