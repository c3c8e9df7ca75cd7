use serde::Deserialize;
use thiserror::Error;

fn default_port() -> u16 { 8080 }
fn default_cors_origins() -> Vec<String> { vec!["http://localhost:5173".to_string()] }
fn default_weather_base_url() -> String { "https://api.open-meteo.com".to_string() }
fn default_weather_timeout_s() -> u64 { 10 }
fn default_prediction_limit() -> usize { 50 }
fn default_optimization_limit() -> usize { 10 }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the API from a browser. `*` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), cors_origins: default_cors_origins() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    #[serde(default = "default_weather_timeout_s")]
    pub timeout_s: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self { base_url: default_weather_base_url(), timeout_s: default_weather_timeout_s() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON snapshot of all records; in-memory only when absent.
    #[serde(default)]
    pub snapshot_path: Option<String>,
    #[serde(default = "default_prediction_limit")]
    pub default_prediction_limit: usize,
    #[serde(default = "default_optimization_limit")]
    pub default_optimization_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            default_prediction_limit: default_prediction_limit(),
            default_optimization_limit: default_optimization_limit(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.weather.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("weather.base_url must not be empty".into()));
        }
        if self.weather.timeout_s == 0 {
            return Err(ConfigError::Invalid("weather.timeout_s must be at least 1".into()));
        }
        if self.storage.default_prediction_limit == 0 || self.storage.default_optimization_limit == 0 {
            return Err(ConfigError::Invalid("default list limits must be positive".into()));
        }
        Ok(())
    }
}
