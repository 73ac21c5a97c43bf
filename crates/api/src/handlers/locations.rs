//! Handlers for the `/locations` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tally_core::error::CoreError;
use tally_core::types::DbId;
use tally_db::models::location::{CreateLocation, UpdateLocation};
use tally_db::repositories::LocationRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/initiatives/{id}/locations
pub async fn list_for_initiative(
    State(state): State<AppState>,
    Path(initiative_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let locations = LocationRepo::list_by_initiative(&state.pool, initiative_id).await?;
    Ok(Json(DataResponse { data: locations }))
}

/// POST /api/v1/locations
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateLocation>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let location = LocationRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: location })))
}

/// GET /api/v1/locations/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let location = LocationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }))?;
    Ok(Json(DataResponse { data: location }))
}

/// PUT /api/v1/locations/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLocation>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let location = LocationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }))?;
    Ok(Json(DataResponse { data: location }))
}

/// DELETE /api/v1/locations/{id}
///
/// Claims referencing the location fall back to no location.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = LocationRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
