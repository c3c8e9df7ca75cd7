pub mod optimization_controller;
pub mod prediction_controller;
pub mod system_controller;
