//! Handler for the dashboard summary: per-metric totals, the daily
//! cumulative series, and chart axis bounds.
//!
//! The engine is pure; this handler does the impure edge work once per
//! request: scoping the claim rows, converting them to observations, and
//! reading the clock for the lookback anchor.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_core::aggregate::{self, Aggregation, LookbackPeriod};
use tally_core::series::{self, AxisBounds};
use tally_core::types::DbId;
use tally_core::window::DateWindow;
use tally_db::models::claim::ImpactClaim;
use tally_db::repositories::{ClaimRepo, MetricRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub initiative_id: DbId,
    /// Comma-separated metric ids; absent means every metric of the
    /// initiative.
    pub metric_ids: Option<String>,
    /// Comma-separated location ids.
    pub location_ids: Option<String>,
    /// Explicit single-date filter (mutually exclusive with start/end).
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Lookback used when no explicit date filter is given.
    #[serde(default)]
    pub period: LookbackPeriod,
}

/// Summary payload: the aggregation plus axis bounds for the chart.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    #[serde(flatten)]
    pub aggregation: Aggregation,
    pub axis: AxisBounds,
}

/// GET /api/v1/dashboard/summary
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> AppResult<impl IntoResponse> {
    let explicit_window =
        if params.date.is_some() || params.start.is_some() || params.end.is_some() {
            Some(DateWindow::from_parts(
                params.date,
                params.start,
                params.end,
            )?)
        } else {
            None
        };

    let metric_filter = parse_id_list(params.metric_ids.as_deref())?;
    let location_filter = parse_id_list(params.location_ids.as_deref())?;

    // The metrics whose totals must appear even with no claims.
    let metric_ids: Vec<DbId> = match &metric_filter {
        Some(ids) => ids.clone(),
        None => MetricRepo::list_by_initiative(&state.pool, params.initiative_id)
            .await?
            .iter()
            .map(|m| m.id)
            .collect(),
    };

    let claims = ClaimRepo::list_filtered(
        &state.pool,
        params.initiative_id,
        metric_filter.as_deref(),
        location_filter.as_deref(),
        None,
    )
    .await?;
    let observations: Vec<_> = claims.iter().map(ImpactClaim::observation).collect();

    let today = Utc::now().date_naive();
    let aggregation = aggregate::aggregate(
        &observations,
        &metric_ids,
        explicit_window,
        params.period,
        today,
    );
    let axis = series::axis_bounds(&aggregation.series, &metric_ids);

    Ok(Json(DataResponse {
        data: DashboardSummary { aggregation, axis },
    }))
}

/// Parse a comma-separated id list query value.
fn parse_id_list(raw: Option<&str>) -> Result<Option<Vec<DbId>>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| AppError::BadRequest(format!("invalid id '{s}' in list")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(ids))
}
