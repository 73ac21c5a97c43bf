//! Repository for the `initiatives` table.

use sqlx::PgPool;
use tally_core::types::DbId;

use crate::models::initiative::{CreateInitiative, Initiative, UpdateInitiative};

/// Column list for `initiatives` SELECT queries.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides query operations for initiatives.
pub struct InitiativeRepo;

impl InitiativeRepo {
    /// Insert a new initiative.
    pub async fn create(pool: &PgPool, input: &CreateInitiative) -> Result<Initiative, sqlx::Error> {
        let query = format!(
            "INSERT INTO initiatives (name, description) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Initiative>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// List all initiatives, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Initiative>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM initiatives ORDER BY created_at DESC");
        sqlx::query_as::<_, Initiative>(&query).fetch_all(pool).await
    }

    /// Find an initiative by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Initiative>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM initiatives WHERE id = $1");
        sqlx::query_as::<_, Initiative>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update an initiative. Returns `None` if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInitiative,
    ) -> Result<Option<Initiative>, sqlx::Error> {
        let query = format!(
            "UPDATE initiatives SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Initiative>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete an initiative and, via cascade, everything it owns.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM initiatives WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
