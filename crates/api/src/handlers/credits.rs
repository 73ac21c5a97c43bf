//! Handlers for the `/credits` resource.
//!
//! The conservation invariant lives in `tally_db::CreditRepo`: proposals
//! and updates validate inside one transaction under the metric row
//! lock. An over-allocation surfaces here as a 409 whose body carries
//! the remaining available amount.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tally_core::error::CoreError;
use tally_core::ledger::Availability;
use tally_core::types::DbId;
use tally_db::models::credit::{CreateCreditAllocation, UpdateCreditAllocation};
use tally_db::repositories::CreditRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScopeParams {
    pub metric_id: DbId,
    /// Narrow to one claim; absent means the whole metric.
    pub claim_id: Option<DbId>,
}

/// GET /api/v1/credits?metric_id=&claim_id=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> AppResult<impl IntoResponse> {
    let allocations = CreditRepo::list(&state.pool, params.metric_id, params.claim_id).await?;
    Ok(Json(DataResponse { data: allocations }))
}

/// GET /api/v1/donors/{id}/credits
pub async fn list_for_donor(
    State(state): State<AppState>,
    Path(donor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let allocations = CreditRepo::list_by_donor(&state.pool, donor_id).await?;
    Ok(Json(DataResponse { data: allocations }))
}

/// GET /api/v1/credits/available?metric_id=&claim_id=
///
/// Remaining creditable capacity for a claim or, without `claim_id`, the
/// metric pool. Advisory: the authoritative check runs again inside the
/// proposal transaction.
pub async fn available(
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> AppResult<impl IntoResponse> {
    let available = CreditRepo::available(&state.pool, params.metric_id, params.claim_id).await?;
    Ok(Json(DataResponse {
        data: Availability { available },
    }))
}

/// POST /api/v1/credits
///
/// Proposes a new allocation. Over-allocation is a 409 with `requested`
/// and `available` in the error body.
pub async fn propose(
    State(state): State<AppState>,
    Json(input): Json<CreateCreditAllocation>,
) -> AppResult<impl IntoResponse> {
    let allocation = CreditRepo::propose(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: allocation })))
}

/// PUT /api/v1/credits/{id}
///
/// Availability is recomputed excluding the allocation's own prior
/// value, so raising a credit within its scope's capacity succeeds.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCreditAllocation>,
) -> AppResult<impl IntoResponse> {
    let allocation = CreditRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CreditAllocation",
            id,
        }))?;
    Ok(Json(DataResponse { data: allocation }))
}

/// DELETE /api/v1/credits/{id}
///
/// Always permitted; the scope's capacity grows back by the credited
/// value.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = CreditRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "CreditAllocation",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
