//! Shared plumbing for conservation checks.
//!
//! Every writer that can change a metric's credited/claimed balance
//! (credit proposals and updates, claim revaluations and deletions)
//! serializes on the same metric row lock and feeds the same ledger
//! row shapes into `tally_core::ledger`.

use sqlx::{PgPool, Postgres, Transaction};
use tally_core::claim::ClaimObservation;
use tally_core::error::CoreError;
use tally_core::ledger::Allocation;
use tally_core::types::DbId;

use crate::error::DbError;

/// Take the per-metric row lock all conservation writers serialize on.
/// Fails with `UnknownReference` when the metric does not exist.
pub(super) async fn lock_metric(
    tx: &mut Transaction<'_, Postgres>,
    metric_id: DbId,
) -> Result<(), DbError> {
    let locked: Option<(DbId,)> = sqlx::query_as("SELECT id FROM metrics WHERE id = $1 FOR UPDATE")
        .bind(metric_id)
        .fetch_optional(&mut **tx)
        .await?;
    if locked.is_none() {
        return Err(CoreError::UnknownReference {
            entity: "Metric",
            id: metric_id,
        }
        .into());
    }
    Ok(())
}

/// Verify a metric exists without locking it (read paths).
pub(super) async fn ensure_metric_exists(pool: &PgPool, metric_id: DbId) -> Result<(), DbError> {
    let exists: Option<(DbId,)> = sqlx::query_as("SELECT id FROM metrics WHERE id = $1")
        .bind(metric_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(CoreError::UnknownReference {
            entity: "Metric",
            id: metric_id,
        }
        .into());
    }
    Ok(())
}

/// Ledger row shape for claims of a metric.
#[derive(sqlx::FromRow)]
struct ClaimValueRow {
    id: DbId,
    metric_id: DbId,
    value: f64,
}

impl ClaimValueRow {
    fn into_observation(self) -> ClaimObservation {
        ClaimObservation {
            id: self.id,
            metric_id: self.metric_id,
            value: self.value,
            // Ledger math never looks at windows.
            window: None,
        }
    }
}

/// Ledger row shape for allocations of a metric.
#[derive(sqlx::FromRow)]
struct AllocationRow {
    id: DbId,
    claim_id: Option<DbId>,
    credited_value: f64,
}

impl AllocationRow {
    fn into_entry(self) -> Allocation {
        Allocation {
            id: self.id,
            claim_id: self.claim_id,
            credited_value: self.credited_value,
        }
    }
}

const CLAIM_VALUE_SQL: &str = "SELECT id, metric_id, value FROM impact_claims WHERE metric_id = $1";
const ALLOCATION_SQL: &str =
    "SELECT id, claim_id, credited_value FROM credit_allocations WHERE metric_id = $1";

pub(super) async fn load_claims(
    pool: &PgPool,
    metric_id: DbId,
) -> Result<Vec<ClaimObservation>, sqlx::Error> {
    let rows: Vec<ClaimValueRow> = sqlx::query_as(CLAIM_VALUE_SQL)
        .bind(metric_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(ClaimValueRow::into_observation).collect())
}

pub(super) async fn load_claims_tx(
    tx: &mut Transaction<'_, Postgres>,
    metric_id: DbId,
) -> Result<Vec<ClaimObservation>, sqlx::Error> {
    let rows: Vec<ClaimValueRow> = sqlx::query_as(CLAIM_VALUE_SQL)
        .bind(metric_id)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows.into_iter().map(ClaimValueRow::into_observation).collect())
}

pub(super) async fn load_allocations(
    pool: &PgPool,
    metric_id: DbId,
) -> Result<Vec<Allocation>, sqlx::Error> {
    let rows: Vec<AllocationRow> = sqlx::query_as(ALLOCATION_SQL)
        .bind(metric_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(AllocationRow::into_entry).collect())
}

pub(super) async fn load_allocations_tx(
    tx: &mut Transaction<'_, Postgres>,
    metric_id: DbId,
) -> Result<Vec<Allocation>, sqlx::Error> {
    let rows: Vec<AllocationRow> = sqlx::query_as(ALLOCATION_SQL)
        .bind(metric_id)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows.into_iter().map(AllocationRow::into_entry).collect())
}
