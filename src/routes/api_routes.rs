use axum::{routing::{delete, get}, Router};

use crate::controllers::optimization_controller::{
    create_optimization, delete_optimization, list_optimizations,
};
use crate::controllers::prediction_controller::{
    clear_predictions, create_prediction, delete_prediction, list_predictions,
};
use crate::controllers::system_controller::health;
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/predictions",        get(list_predictions).post(create_prediction).delete(clear_predictions))
        .route("/predictions/{id}",   delete(delete_prediction))
        .route("/optimizations",      get(list_optimizations).post(create_optimization))
        .route("/optimizations/{id}", delete(delete_optimization))
        .route("/health",             get(health))
        .with_state(state)
}
