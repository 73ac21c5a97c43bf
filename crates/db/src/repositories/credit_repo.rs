//! Repository for the `credit_allocations` table.
//!
//! Conservation of credited value is enforced here: every proposal or
//! update runs inside one transaction that first takes a row lock on the
//! allocation's metric, then recomputes the allocated sums and validates
//! through `tally_core::ledger` before writing. Two racing proposals for
//! the same metric serialize on that lock, so the second always
//! revalidates against the first one's committed write and the invariant
//! holds without any read-then-write gap.

use sqlx::PgPool;
use tally_core::ledger::{self, AllocationCandidate};
use tally_core::types::DbId;

use super::conservation::{
    ensure_metric_exists, load_allocations, load_allocations_tx, load_claims, load_claims_tx,
    lock_metric,
};
use crate::error::DbError;
use crate::models::credit::{CreateCreditAllocation, CreditAllocation, UpdateCreditAllocation};

/// Column list for `credit_allocations` SELECT queries.
const COLUMNS: &str = "\
    id, donor_id, metric_id, claim_id, credited_value, credited_percent, \
    notes, created_at, updated_at";

/// Provides query operations for credit allocations.
pub struct CreditRepo;

impl CreditRepo {
    /// List allocations for a metric, optionally narrowed to one claim
    /// scope (`Some(claim_id)`).
    pub async fn list(
        pool: &PgPool,
        metric_id: DbId,
        claim_id: Option<DbId>,
    ) -> Result<Vec<CreditAllocation>, sqlx::Error> {
        match claim_id {
            Some(claim_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM credit_allocations \
                     WHERE metric_id = $1 AND claim_id = $2 \
                     ORDER BY created_at ASC"
                );
                sqlx::query_as::<_, CreditAllocation>(&query)
                    .bind(metric_id)
                    .bind(claim_id)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM credit_allocations \
                     WHERE metric_id = $1 \
                     ORDER BY created_at ASC"
                );
                sqlx::query_as::<_, CreditAllocation>(&query)
                    .bind(metric_id)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// List all allocations attributed to a donor.
    pub async fn list_by_donor(
        pool: &PgPool,
        donor_id: DbId,
    ) -> Result<Vec<CreditAllocation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_allocations \
             WHERE donor_id = $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, CreditAllocation>(&query)
            .bind(donor_id)
            .fetch_all(pool)
            .await
    }

    /// Find an allocation by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CreditAllocation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM credit_allocations WHERE id = $1");
        sqlx::query_as::<_, CreditAllocation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Remaining creditable capacity for a claim or, with
    /// `claim_id = None`, for the metric pool. Plain read; the
    /// authoritative check happens again inside [`Self::propose`].
    pub async fn available(
        pool: &PgPool,
        metric_id: DbId,
        claim_id: Option<DbId>,
    ) -> Result<f64, DbError> {
        ensure_metric_exists(pool, metric_id).await?;
        let claims = load_claims(pool, metric_id).await?;
        let allocations = load_allocations(pool, metric_id).await?;
        let available = ledger::available_to_credit(&claims, &allocations, claim_id, None)?;
        Ok(available)
    }

    /// Validate and durably record a new allocation.
    ///
    /// Fails with [`CoreError::OverAllocation`] when the proposal exceeds
    /// the remaining capacity of its scope; the error carries the actual
    /// available amount.
    pub async fn propose(
        pool: &PgPool,
        input: &CreateCreditAllocation,
    ) -> Result<CreditAllocation, DbError> {
        let mut tx = pool.begin().await?;
        lock_metric(&mut tx, input.metric_id).await?;

        let claims = load_claims_tx(&mut tx, input.metric_id).await?;
        let allocations = load_allocations_tx(&mut tx, input.metric_id).await?;
        let candidate = AllocationCandidate {
            id: None,
            metric_id: input.metric_id,
            claim_id: input.claim_id,
            credited_value: input.credited_value,
        };
        if let Err(err) = ledger::validate_allocation(&candidate, &claims, &allocations) {
            tracing::debug!(
                metric_id = input.metric_id,
                claim_id = ?input.claim_id,
                requested = input.credited_value,
                %err,
                "credit proposal rejected"
            );
            return Err(err.into());
        }

        let query = format!(
            "INSERT INTO credit_allocations \
                (donor_id, metric_id, claim_id, credited_value, credited_percent, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let allocation = sqlx::query_as::<_, CreditAllocation>(&query)
            .bind(input.donor_id)
            .bind(input.metric_id)
            .bind(input.claim_id)
            .bind(input.credited_value)
            .bind(input.credited_percent)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(allocation)
    }

    /// Validate and apply an update to an existing allocation. Returns
    /// `Ok(None)` if the id does not exist.
    ///
    /// Availability is recomputed excluding the allocation's own prior
    /// value, so raising a credit within its scope's capacity succeeds.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCreditAllocation,
    ) -> Result<Option<CreditAllocation>, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM credit_allocations WHERE id = $1 FOR UPDATE");
        let Some(existing) = sqlx::query_as::<_, CreditAllocation>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        lock_metric(&mut tx, existing.metric_id).await?;

        let claims = load_claims_tx(&mut tx, existing.metric_id).await?;
        let allocations = load_allocations_tx(&mut tx, existing.metric_id).await?;
        let candidate = AllocationCandidate {
            id: Some(id),
            metric_id: existing.metric_id,
            claim_id: existing.claim_id,
            credited_value: input.credited_value.unwrap_or(existing.credited_value),
        };
        ledger::validate_allocation(&candidate, &claims, &allocations)?;

        let query = format!(
            "UPDATE credit_allocations SET \
                credited_value = $2, \
                credited_percent = COALESCE($3, credited_percent), \
                notes = COALESCE($4, notes), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let allocation = sqlx::query_as::<_, CreditAllocation>(&query)
            .bind(id)
            .bind(candidate.credited_value)
            .bind(input.credited_percent)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(allocation))
    }

    /// Delete an allocation. Always permitted; capacity for its scope
    /// grows back by the credited value.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM credit_allocations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
