//! Handlers for the `/donors` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tally_core::error::CoreError;
use tally_core::types::DbId;
use tally_db::models::donor::{CreateDonor, UpdateDonor};
use tally_db::repositories::DonorRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/initiatives/{id}/donors
pub async fn list_for_initiative(
    State(state): State<AppState>,
    Path(initiative_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let donors = DonorRepo::list_by_initiative(&state.pool, initiative_id).await?;
    Ok(Json(DataResponse { data: donors }))
}

/// POST /api/v1/donors
///
/// A duplicate email within the initiative (case-insensitive) surfaces
/// as a 409 via the `uq_donors_email` unique index.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDonor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let donor = DonorRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: donor })))
}

/// GET /api/v1/donors/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let donor = DonorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Donor",
            id,
        }))?;
    Ok(Json(DataResponse { data: donor }))
}

/// PUT /api/v1/donors/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDonor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let donor = DonorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Donor",
            id,
        }))?;
    Ok(Json(DataResponse { data: donor }))
}

/// DELETE /api/v1/donors/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = DonorRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Donor",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
