pub mod optimizer;
pub mod power_model;
pub mod prediction_service;
pub mod solar_geometry;
pub mod weather_service;
