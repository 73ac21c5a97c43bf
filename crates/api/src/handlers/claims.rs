//! Handlers for the `/claims` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tally_core::error::CoreError;
use tally_core::types::DbId;
use tally_db::models::claim::{CreateImpactClaim, UpdateImpactClaim};
use tally_db::repositories::ClaimRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/metrics/{id}/claims
///
/// Claims of a metric in effective-date order.
pub async fn list_for_metric(
    State(state): State<AppState>,
    Path(metric_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let claims = ClaimRepo::list_by_metric(&state.pool, metric_id).await?;
    Ok(Json(DataResponse { data: claims }))
}

/// POST /api/v1/claims
///
/// The window (single date XOR start/end range) and the value (against
/// the metric's numeric kind) are validated before insertion.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateImpactClaim>,
) -> AppResult<impl IntoResponse> {
    let claim = ClaimRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: claim })))
}

/// GET /api/v1/claims/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let claim = ClaimRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImpactClaim",
            id,
        }))?;
    Ok(Json(DataResponse { data: claim }))
}

/// PUT /api/v1/claims/{id}
///
/// Lowering the value below what is already credited is rejected with
/// 409.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateImpactClaim>,
) -> AppResult<impl IntoResponse> {
    let claim = ClaimRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ImpactClaim",
            id,
        }))?;
    Ok(Json(DataResponse { data: claim }))
}

/// DELETE /api/v1/claims/{id}
///
/// Credit allocations scoped to the claim go with it; the deletion is
/// rejected with 409 when it would leave pool credits uncovered.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = ClaimRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ImpactClaim",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
