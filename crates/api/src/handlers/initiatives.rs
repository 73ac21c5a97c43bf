//! Handlers for the `/initiatives` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tally_core::error::CoreError;
use tally_core::types::DbId;
use tally_db::models::initiative::{CreateInitiative, UpdateInitiative};
use tally_db::repositories::InitiativeRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/initiatives
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let initiatives = InitiativeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: initiatives }))
}

/// POST /api/v1/initiatives
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateInitiative>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let initiative = InitiativeRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: initiative })))
}

/// GET /api/v1/initiatives/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let initiative = InitiativeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Initiative",
            id,
        }))?;
    Ok(Json(DataResponse { data: initiative }))
}

/// PUT /api/v1/initiatives/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInitiative>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let initiative = InitiativeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Initiative",
            id,
        }))?;
    Ok(Json(DataResponse { data: initiative }))
}

/// DELETE /api/v1/initiatives/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = InitiativeRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Initiative",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
