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
use crate::models::optimization::{OptimizationRecord, OptimizationRequest, OptimizationResponse};
use crate::models::prediction::ListQuery;
use crate::services::prediction_service;
use crate::shared_state::AppState;

/// POST /api/optimizations
/// Suggest a better tilt and azimuth
///
/// Evaluates tilt 0-60° (step 5) against azimuth 120-240° (step 10) under
/// current weather and compares the best pair to the caller's configuration.
#[utoipa::path(
    post,
    path = "/api/optimizations",
    request_body = OptimizationRequest,
    responses(
        (status = 200, description = "Stored optimization", body = OptimizationResponse),
        (status = 400, description = "Invalid input"),
        (status = 502, description = "Weather service unavailable")
    )
)]
pub async fn create_optimization(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<OptimizationRequest>,
) -> Result<Json<OptimizationResponse>, AppError> {
    let record = prediction_service::optimize(&state, user, req, chrono::Utc::now()).await?;
    Ok(Json(OptimizationResponse::from(&record)))
}

/// GET /api/optimizations
#[utoipa::path(
    get,
    path = "/api/optimizations",
    params(ListQuery),
    responses(
        (status = 200, description = "Optimizations, newest first", body = Vec<OptimizationRecord>)
    )
)]
pub async fn list_optimizations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Json<Vec<OptimizationRecord>> {
    match user {
        Some(user) => Json(state.user_optimizations(&user, query.limit)),
        None => Json(Vec::new()),
    }
}

/// DELETE /api/optimizations/{id}
#[utoipa::path(
    delete,
    path = "/api/optimizations/{id}",
    params(
        ("id" = Uuid, Path, description = "Optimization ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "No caller identity"),
        (status = 404, description = "No such optimization for this caller")
    )
)]
pub async fn delete_optimization(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = user.ok_or(AppError::Unauthenticated)?;
    state.delete_optimization(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
