//! Repository for the `impact_claims` table.
//!
//! Create and update validate the temporal window and the value against
//! the metric's numeric kind before writing, so a malformed claim never
//! reaches the table. Writes that can shrink credited capacity (lowering
//! a value, deleting a claim) serialize on the same metric row lock the
//! credit repository uses and revalidate the ledger before committing.

use sqlx::{PgPool, QueryBuilder};
use tally_core::claim::validate_claim_value;
use tally_core::error::CoreError;
use tally_core::ledger;
use tally_core::types::DbId;
use tally_core::window::DateWindow;

use super::conservation::{load_allocations_tx, load_claims_tx, lock_metric};
use crate::error::DbError;
use crate::models::claim::{CreateImpactClaim, ImpactClaim, UpdateImpactClaim};

/// Column list for `impact_claims` SELECT queries.
const COLUMNS: &str = "\
    id, metric_id, value, label, note, location_id, \
    represented_date, period_start, period_end, created_at, updated_at";

/// Provides query operations for impact claims.
pub struct ClaimRepo;

impl ClaimRepo {
    /// Insert a new impact claim after validating its window and value.
    pub async fn create(pool: &PgPool, input: &CreateImpactClaim) -> Result<ImpactClaim, DbError> {
        let window = input.window()?;
        let kind = metric_kind(pool, input.metric_id).await?;
        validate_claim_value(input.value, kind)?;

        let query = format!(
            "INSERT INTO impact_claims \
                (metric_id, value, label, note, location_id, \
                 represented_date, period_start, period_end) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let (date, start, end) = window_columns(&window);
        let claim = sqlx::query_as::<_, ImpactClaim>(&query)
            .bind(input.metric_id)
            .bind(input.value)
            .bind(&input.label)
            .bind(&input.note)
            .bind(input.location_id)
            .bind(date)
            .bind(start)
            .bind(end)
            .fetch_one(pool)
            .await?;
        Ok(claim)
    }

    /// List all claims of a metric in chronological (effective-date) order.
    pub async fn list_by_metric(
        pool: &PgPool,
        metric_id: DbId,
    ) -> Result<Vec<ImpactClaim>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM impact_claims \
             WHERE metric_id = $1 \
             ORDER BY COALESCE(period_end, represented_date) ASC, id ASC"
        );
        sqlx::query_as::<_, ImpactClaim>(&query)
            .bind(metric_id)
            .fetch_all(pool)
            .await
    }

    /// List claims for an initiative with optional metric, location, and
    /// effective-date filters. This is the aggregation engine's feed.
    pub async fn list_filtered(
        pool: &PgPool,
        initiative_id: DbId,
        metric_ids: Option<&[DbId]>,
        location_ids: Option<&[DbId]>,
        window: Option<DateWindow>,
    ) -> Result<Vec<ImpactClaim>, sqlx::Error> {
        let mut qb = QueryBuilder::new(
            "SELECT c.id, c.metric_id, c.value, c.label, c.note, c.location_id, \
                    c.represented_date, c.period_start, c.period_end, \
                    c.created_at, c.updated_at \
             FROM impact_claims c \
             INNER JOIN metrics m ON m.id = c.metric_id \
             WHERE m.initiative_id = ",
        );
        qb.push_bind(initiative_id);
        if let Some(ids) = metric_ids {
            qb.push(" AND c.metric_id = ANY(");
            qb.push_bind(ids.to_vec());
            qb.push(")");
        }
        if let Some(ids) = location_ids {
            qb.push(" AND c.location_id = ANY(");
            qb.push_bind(ids.to_vec());
            qb.push(")");
        }
        if let Some(w) = window {
            qb.push(" AND COALESCE(c.period_end, c.represented_date) BETWEEN ");
            qb.push_bind(w.start());
            qb.push(" AND ");
            qb.push_bind(w.end());
        }
        qb.push(" ORDER BY COALESCE(c.period_end, c.represented_date) ASC, c.id ASC");
        qb.build_query_as::<ImpactClaim>().fetch_all(pool).await
    }

    /// Find a claim by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ImpactClaim>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM impact_claims WHERE id = $1");
        sqlx::query_as::<_, ImpactClaim>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a claim. Returns `Ok(None)` if the id does not exist.
    ///
    /// A replacement window (any of the three date fields present) is
    /// validated as a whole and overwrites the stored triple; the value,
    /// when changed, is re-validated against the metric kind. Lowering
    /// the value takes the metric lock and is rejected with
    /// [`CoreError::Conflict`] when recorded credits no longer fit under
    /// the new value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateImpactClaim,
    ) -> Result<Option<ImpactClaim>, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM impact_claims WHERE id = $1 FOR UPDATE");
        let Some(existing) = sqlx::query_as::<_, ImpactClaim>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let window = if input.touches_window() {
            input.window()?
        } else {
            existing.window()?
        };
        let value = input.value.unwrap_or(existing.value);
        if let Some(new_value) = input.value {
            let kind = metric_kind(&mut *tx, existing.metric_id).await?;
            validate_claim_value(new_value, kind)?;
            if new_value < existing.value {
                lock_metric(&mut tx, existing.metric_id).await?;
                let claims = load_claims_tx(&mut tx, existing.metric_id).await?;
                let allocations = load_allocations_tx(&mut tx, existing.metric_id).await?;
                ledger::validate_claim_revaluation(id, new_value, &claims, &allocations)?;
            }
        }

        let query = format!(
            "UPDATE impact_claims SET \
                value = $2, \
                label = COALESCE($3, label), \
                note = COALESCE($4, note), \
                location_id = COALESCE($5, location_id), \
                represented_date = $6, \
                period_start = $7, \
                period_end = $8, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let (date, start, end) = window_columns(&window);
        let claim = sqlx::query_as::<_, ImpactClaim>(&query)
            .bind(id)
            .bind(value)
            .bind(&input.label)
            .bind(&input.note)
            .bind(input.location_id)
            .bind(date)
            .bind(start)
            .bind(end)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(claim))
    }

    /// Delete a claim. Credit allocations scoped to it go with it, so
    /// the deletion runs under the metric lock and is rejected with
    /// [`CoreError::Conflict`] when pool-scoped credits would be left
    /// exceeding what the remaining claims cover.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT metric_id FROM impact_claims WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((metric_id,)) = row else {
            return Ok(false);
        };
        lock_metric(&mut tx, metric_id).await?;

        let claims = load_claims_tx(&mut tx, metric_id).await?;
        let allocations = load_allocations_tx(&mut tx, metric_id).await?;
        ledger::validate_claim_removal(id, &claims, &allocations)?;

        sqlx::query("DELETE FROM impact_claims WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }
}

/// Split a domain window into its nullable column triple.
fn window_columns(
    window: &DateWindow,
) -> (
    Option<chrono::NaiveDate>,
    Option<chrono::NaiveDate>,
    Option<chrono::NaiveDate>,
) {
    match *window {
        DateWindow::On { date } => (Some(date), None, None),
        DateWindow::Between { start, end } => (None, Some(start), Some(end)),
    }
}

/// Load a metric's numeric kind, failing with `UnknownReference` when
/// the metric does not exist.
async fn metric_kind<'e, E>(
    executor: E,
    metric_id: DbId,
) -> Result<tally_core::claim::MetricKind, DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let kind: Option<(String,)> = sqlx::query_as("SELECT kind FROM metrics WHERE id = $1")
        .bind(metric_id)
        .fetch_optional(executor)
        .await?;
    let (kind,) = kind.ok_or(CoreError::UnknownReference {
        entity: "Metric",
        id: metric_id,
    })?;
    tally_core::claim::MetricKind::parse(&kind)
        .ok_or_else(|| CoreError::Internal(format!("unrecognized metric kind '{kind}'")).into())
}
