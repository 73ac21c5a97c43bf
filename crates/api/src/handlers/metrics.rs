//! Handlers for the `/metrics` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tally_core::error::CoreError;
use tally_core::types::DbId;
use tally_db::models::metric::{CreateMetric, UpdateMetric};
use tally_db::repositories::MetricRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/initiatives/{id}/metrics
pub async fn list_for_initiative(
    State(state): State<AppState>,
    Path(initiative_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let metrics = MetricRepo::list_by_initiative(&state.pool, initiative_id).await?;
    Ok(Json(DataResponse { data: metrics }))
}

/// POST /api/v1/metrics
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateMetric>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let metric = MetricRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: metric })))
}

/// GET /api/v1/metrics/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let metric = MetricRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Metric",
            id,
        }))?;
    Ok(Json(DataResponse { data: metric }))
}

/// PUT /api/v1/metrics/{id}
///
/// The numeric kind is immutable; [`UpdateMetric`] does not carry it.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMetric>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let metric = MetricRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Metric",
            id,
        }))?;
    Ok(Json(DataResponse { data: metric }))
}

/// DELETE /api/v1/metrics/{id}
///
/// Cascades to the metric's claims, credit allocations, and evidence links.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = MetricRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Metric",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
