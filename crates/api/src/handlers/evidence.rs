//! Handlers for the `/evidence` resource: CRUD, coverage assessment,
//! and the user-curated claim link set.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tally_core::coverage::{self, SelectionPolicy};
use tally_core::error::CoreError;
use tally_core::types::DbId;
use tally_db::models::claim::ImpactClaim;
use tally_db::models::evidence::{CreateEvidenceItem, UpdateEvidenceItem};
use tally_db::repositories::EvidenceRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/initiatives/{id}/evidence
pub async fn list_for_initiative(
    State(state): State<AppState>,
    Path(initiative_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let items = EvidenceRepo::list_by_initiative(&state.pool, initiative_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/evidence
///
/// Creates the item with its initial metric and location links. Claim
/// links are set separately, after the coverage assessment.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateEvidenceItem>,
) -> AppResult<impl IntoResponse> {
    let item = EvidenceRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /api/v1/evidence/{id}
///
/// Returns the item together with its metric, location, and claim links.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = EvidenceRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EvidenceItem",
            id,
        }))?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/evidence/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvidenceItem>,
) -> AppResult<impl IntoResponse> {
    let item = EvidenceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EvidenceItem",
            id,
        }))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/evidence/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = EvidenceRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "EvidenceItem",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Coverage + claim links
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CoverageParams {
    /// Which coverage levels are pre-selected (`any_overlap` | `full_only`).
    #[serde(default)]
    pub policy: SelectionPolicy,
}

/// GET /api/v1/evidence/{id}/coverage?policy=any_overlap
///
/// Assesses how much of each candidate claim (every claim of a metric
/// the evidence is linked to) the evidence window attests to. Disjoint
/// claims are reported with 0% so the mismatch is visible.
pub async fn coverage(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<CoverageParams>,
) -> AppResult<impl IntoResponse> {
    let item = EvidenceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EvidenceItem",
            id,
        }))?;
    let evidence_window = item.window()?;

    let candidates = EvidenceRepo::list_candidate_claims(&state.pool, id).await?;
    let observations: Vec<_> = candidates.iter().map(ImpactClaim::observation).collect();
    let assessments = coverage::assess(evidence_window, &observations, params.policy);
    Ok(Json(DataResponse { data: assessments }))
}

/// Replacement claim link set for an evidence item.
#[derive(Debug, Deserialize)]
pub struct SetClaimLinks {
    pub claim_ids: Vec<DbId>,
}

/// PUT /api/v1/evidence/{id}/claims
///
/// Replaces the link set wholesale. Links are user-curated; the coverage
/// assessment only informs the default selection client-side.
pub async fn set_claims(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetClaimLinks>,
) -> AppResult<impl IntoResponse> {
    EvidenceRepo::set_claim_links(&state.pool, id, &input.claim_ids).await?;
    let linked = EvidenceRepo::list_claims_for_evidence(&state.pool, id).await?;
    Ok(Json(DataResponse { data: linked }))
}

/// GET /api/v1/evidence/{id}/claims
pub async fn list_claims(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let linked = EvidenceRepo::list_claims_for_evidence(&state.pool, id).await?;
    Ok(Json(DataResponse { data: linked }))
}

/// GET /api/v1/claims/{id}/evidence
pub async fn list_for_claim(
    State(state): State<AppState>,
    Path(claim_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let items = EvidenceRepo::list_for_claim(&state.pool, claim_id).await?;
    Ok(Json(DataResponse { data: items }))
}
