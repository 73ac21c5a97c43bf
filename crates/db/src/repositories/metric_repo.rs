//! Repository for the `metrics` table.

use sqlx::PgPool;
use tally_core::types::DbId;

use crate::models::metric::{CreateMetric, Metric, UpdateMetric};

/// Column list for `metrics` SELECT queries.
const COLUMNS: &str = "id, initiative_id, title, unit_label, category, kind, created_at, updated_at";

/// Provides query operations for metrics.
pub struct MetricRepo;

impl MetricRepo {
    /// Insert a new metric.
    pub async fn create(pool: &PgPool, input: &CreateMetric) -> Result<Metric, sqlx::Error> {
        let query = format!(
            "INSERT INTO metrics (initiative_id, title, unit_label, category, kind) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Metric>(&query)
            .bind(input.initiative_id)
            .bind(&input.title)
            .bind(&input.unit_label)
            .bind(input.category.as_str())
            .bind(input.kind.as_str())
            .fetch_one(pool)
            .await
    }

    /// List all metrics of an initiative, alphabetically by title.
    pub async fn list_by_initiative(
        pool: &PgPool,
        initiative_id: DbId,
    ) -> Result<Vec<Metric>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM metrics WHERE initiative_id = $1 ORDER BY title ASC"
        );
        sqlx::query_as::<_, Metric>(&query)
            .bind(initiative_id)
            .fetch_all(pool)
            .await
    }

    /// Find a metric by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Metric>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM metrics WHERE id = $1");
        sqlx::query_as::<_, Metric>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a metric. Returns `None` if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMetric,
    ) -> Result<Option<Metric>, sqlx::Error> {
        let query = format!(
            "UPDATE metrics SET \
                title = COALESCE($2, title), \
                unit_label = COALESCE($3, unit_label), \
                category = COALESCE($4, category), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Metric>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.unit_label)
            .bind(input.category.map(|c| c.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a metric. This is the explicit cascade: claims, credit
    /// allocations, and evidence links referencing the metric go with it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM metrics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
