//! Repository for `evidence_items` and its link tables.
//!
//! Claim links are user-curated: the coverage assessment proposes a
//! default set, but only an explicit `set_claim_links` call changes what
//! an evidence item is attached to.

use sqlx::{PgPool, Postgres, Transaction};
use tally_core::error::CoreError;
use tally_core::types::DbId;
use tally_core::window::DateWindow;

use crate::error::DbError;
use crate::models::claim::ImpactClaim;
use crate::models::evidence::{
    CreateEvidenceItem, EvidenceDetail, EvidenceItem, UpdateEvidenceItem,
};

/// Column list for `evidence_items` SELECT queries.
const COLUMNS: &str = "\
    id, initiative_id, kind, file_ref, description, \
    represented_date, period_start, period_end, created_at, updated_at";

/// Column list for claim rows joined through `evidence_claims`.
const CLAIM_COLUMNS: &str = "\
    c.id, c.metric_id, c.value, c.label, c.note, c.location_id, \
    c.represented_date, c.period_start, c.period_end, c.created_at, c.updated_at";

/// Provides query operations for evidence items and their links.
pub struct EvidenceRepo;

impl EvidenceRepo {
    /// Insert a new evidence item with its initial metric and location
    /// links, validating the window first.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEvidenceItem,
    ) -> Result<EvidenceItem, DbError> {
        let window = input.window()?;

        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO evidence_items \
                (initiative_id, kind, file_ref, description, \
                 represented_date, period_start, period_end) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let (date, start, end) = match window {
            DateWindow::On { date } => (Some(date), None, None),
            DateWindow::Between { start, end } => (None, Some(start), Some(end)),
        };
        let item = sqlx::query_as::<_, EvidenceItem>(&query)
            .bind(input.initiative_id)
            .bind(&input.kind)
            .bind(&input.file_ref)
            .bind(&input.description)
            .bind(date)
            .bind(start)
            .bind(end)
            .fetch_one(&mut *tx)
            .await?;

        for metric_id in &input.metric_ids {
            sqlx::query("INSERT INTO evidence_metrics (evidence_id, metric_id) VALUES ($1, $2)")
                .bind(item.id)
                .bind(metric_id)
                .execute(&mut *tx)
                .await?;
        }
        for location_id in &input.location_ids {
            sqlx::query("INSERT INTO evidence_locations (evidence_id, location_id) VALUES ($1, $2)")
                .bind(item.id)
                .bind(location_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(item)
    }

    /// List all evidence items of an initiative, newest first.
    pub async fn list_by_initiative(
        pool: &PgPool,
        initiative_id: DbId,
    ) -> Result<Vec<EvidenceItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM evidence_items \
             WHERE initiative_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, EvidenceItem>(&query)
            .bind(initiative_id)
            .fetch_all(pool)
            .await
    }

    /// Find an evidence item by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EvidenceItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM evidence_items WHERE id = $1");
        sqlx::query_as::<_, EvidenceItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an evidence item together with its three link sets.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<EvidenceDetail>, sqlx::Error> {
        let Some(item) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let metric_ids = linked_ids(pool, "evidence_metrics", "metric_id", id).await?;
        let location_ids = linked_ids(pool, "evidence_locations", "location_id", id).await?;
        let claim_ids = linked_ids(pool, "evidence_claims", "claim_id", id).await?;
        Ok(Some(EvidenceDetail {
            item,
            metric_ids,
            location_ids,
            claim_ids,
        }))
    }

    /// Update an evidence item's own fields. Returns `Ok(None)` if the id
    /// does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvidenceItem,
    ) -> Result<Option<EvidenceItem>, DbError> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let window = if input.touches_window() {
            input.window()?
        } else {
            existing.window()?
        };
        let (date, start, end) = match window {
            DateWindow::On { date } => (Some(date), None, None),
            DateWindow::Between { start, end } => (None, Some(start), Some(end)),
        };

        let query = format!(
            "UPDATE evidence_items SET \
                kind = COALESCE($2, kind), \
                file_ref = COALESCE($3, file_ref), \
                description = COALESCE($4, description), \
                represented_date = $5, \
                period_start = $6, \
                period_end = $7, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, EvidenceItem>(&query)
            .bind(id)
            .bind(&input.kind)
            .bind(&input.file_ref)
            .bind(&input.description)
            .bind(date)
            .bind(start)
            .bind(end)
            .fetch_optional(pool)
            .await?;
        Ok(item)
    }

    /// Delete an evidence item and its links.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM evidence_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the set of claims an evidence item is linked to.
    pub async fn set_claim_links(
        pool: &PgPool,
        evidence_id: DbId,
        claim_ids: &[DbId],
    ) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        ensure_evidence_exists(&mut tx, evidence_id).await?;

        sqlx::query("DELETE FROM evidence_claims WHERE evidence_id = $1")
            .bind(evidence_id)
            .execute(&mut *tx)
            .await?;
        for claim_id in claim_ids {
            sqlx::query("INSERT INTO evidence_claims (evidence_id, claim_id) VALUES ($1, $2)")
                .bind(evidence_id)
                .bind(claim_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// List the evidence items linked to a claim.
    pub async fn list_for_claim(
        pool: &PgPool,
        claim_id: DbId,
    ) -> Result<Vec<EvidenceItem>, sqlx::Error> {
        let query = "\
            SELECT e.id, e.initiative_id, e.kind, e.file_ref, e.description, \
                   e.represented_date, e.period_start, e.period_end, \
                   e.created_at, e.updated_at \
            FROM evidence_items e \
            INNER JOIN evidence_claims ec ON ec.evidence_id = e.id \
            WHERE ec.claim_id = $1 \
            ORDER BY e.created_at DESC";
        sqlx::query_as::<_, EvidenceItem>(query)
            .bind(claim_id)
            .fetch_all(pool)
            .await
    }

    /// List the claims an evidence item is linked to.
    pub async fn list_claims_for_evidence(
        pool: &PgPool,
        evidence_id: DbId,
    ) -> Result<Vec<ImpactClaim>, sqlx::Error> {
        let query = format!(
            "SELECT {CLAIM_COLUMNS} \
             FROM impact_claims c \
             INNER JOIN evidence_claims ec ON ec.claim_id = c.id \
             WHERE ec.evidence_id = $1 \
             ORDER BY COALESCE(c.period_end, c.represented_date) ASC, c.id ASC"
        );
        sqlx::query_as::<_, ImpactClaim>(&query)
            .bind(evidence_id)
            .fetch_all(pool)
            .await
    }

    /// List the candidate claims for coverage assessment: every claim of
    /// a metric the evidence is linked to.
    pub async fn list_candidate_claims(
        pool: &PgPool,
        evidence_id: DbId,
    ) -> Result<Vec<ImpactClaim>, sqlx::Error> {
        let query = format!(
            "SELECT {CLAIM_COLUMNS} \
             FROM impact_claims c \
             INNER JOIN evidence_metrics em ON em.metric_id = c.metric_id \
             WHERE em.evidence_id = $1 \
             ORDER BY COALESCE(c.period_end, c.represented_date) ASC, c.id ASC"
        );
        sqlx::query_as::<_, ImpactClaim>(&query)
            .bind(evidence_id)
            .fetch_all(pool)
            .await
    }
}

/// Fetch linked ids from one of the evidence link tables.
async fn linked_ids(
    pool: &PgPool,
    table: &str,
    column: &str,
    evidence_id: DbId,
) -> Result<Vec<DbId>, sqlx::Error> {
    let query = format!("SELECT {column} FROM {table} WHERE evidence_id = $1 ORDER BY {column}");
    let rows: Vec<(DbId,)> = sqlx::query_as(&query)
        .bind(evidence_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Fail with `UnknownReference` when the evidence id does not exist.
async fn ensure_evidence_exists(
    tx: &mut Transaction<'_, Postgres>,
    evidence_id: DbId,
) -> Result<(), DbError> {
    let exists: Option<(DbId,)> = sqlx::query_as("SELECT id FROM evidence_items WHERE id = $1")
        .bind(evidence_id)
        .fetch_optional(&mut **tx)
        .await?;
    if exists.is_none() {
        return Err(CoreError::UnknownReference {
            entity: "EvidenceItem",
            id: evidence_id,
        }
        .into());
    }
    Ok(())
}
