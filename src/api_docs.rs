use utoipa::OpenApi;
use crate::controllers::{optimization_controller, prediction_controller, system_controller};
use crate::models::{optimization, prediction, system};

#[derive(OpenApi)]
#[openapi(
    paths(
        prediction_controller::create_prediction,
        prediction_controller::list_predictions,
        prediction_controller::delete_prediction,
        prediction_controller::clear_predictions,
        optimization_controller::create_optimization,
        optimization_controller::list_optimizations,
        optimization_controller::delete_optimization,
        system_controller::health
    ),
    components(
        schemas(
            prediction::PredictionRequest,
            prediction::PredictionResponse,
            prediction::PredictionRecord,
            prediction::ClearResponse,
            prediction::WeatherData,
            prediction::SolarGeometry,
            optimization::OptimizationRequest,
            optimization::OptimizationResponse,
            optimization::OptimizationRecord,
            system::HealthStatus
        )
    ),
    tags(
        (name = "solar-predict", description = "PV output prediction and orientation optimization API")
    )
)]
pub struct ApiDoc;
