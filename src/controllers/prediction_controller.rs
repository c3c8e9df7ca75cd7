use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::identity::CurrentUser;
use crate::models::prediction::{
    ClearResponse, ListQuery, PredictionRecord, PredictionRequest, PredictionResponse,
};
use crate::services::prediction_service;
use crate::shared_state::AppState;

/// POST /api/predictions
/// Predict current panel output
///
/// Fetches current weather for the site, applies the solar geometry and
/// derating model, stores the result for the caller and returns it.
#[utoipa::path(
    post,
    path = "/api/predictions",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Stored prediction", body = PredictionResponse),
        (status = 400, description = "Invalid input"),
        (status = 502, description = "Weather service unavailable")
    )
)]
pub async fn create_prediction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<PredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let record = prediction_service::predict(&state, user, req, chrono::Utc::now()).await?;
    Ok(Json(PredictionResponse::from(&record)))
}

/// GET /api/predictions
/// List the caller's predictions, newest first
///
/// Anonymous callers get an empty list.
#[utoipa::path(
    get,
    path = "/api/predictions",
    params(ListQuery),
    responses(
        (status = 200, description = "Predictions, newest first", body = Vec<PredictionRecord>)
    )
)]
pub async fn list_predictions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Json<Vec<PredictionRecord>> {
    match user {
        Some(user) => Json(state.user_predictions(&user, query.limit)),
        None => Json(Vec::new()),
    }
}

/// DELETE /api/predictions/{id}
#[utoipa::path(
    delete,
    path = "/api/predictions/{id}",
    params(
        ("id" = Uuid, Path, description = "Prediction ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "No caller identity"),
        (status = 404, description = "No such prediction for this caller")
    )
)]
pub async fn delete_prediction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = user.ok_or(AppError::Unauthenticated)?;
    state.delete_prediction(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/predictions
/// Clear the caller's prediction history
#[utoipa::path(
    delete,
    path = "/api/predictions",
    responses(
        (status = 200, description = "Number of predictions removed", body = ClearResponse),
        (status = 401, description = "No caller identity")
    )
)]
pub async fn clear_predictions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ClearResponse>, AppError> {
    let user = user.ok_or(AppError::Unauthenticated)?;
    let deleted = state.clear_predictions(&user).await?;
    Ok(Json(ClearResponse { deleted }))
}
