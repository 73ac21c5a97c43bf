//! Repository for the `donors` table.

use sqlx::PgPool;
use tally_core::types::DbId;

use crate::models::donor::{CreateDonor, Donor, UpdateDonor};

/// Column list for `donors` SELECT queries.
const COLUMNS: &str = "id, initiative_id, name, email, organization, created_at, updated_at";

/// Provides query operations for donors.
pub struct DonorRepo;

impl DonorRepo {
    /// Insert a new donor. A duplicate email (case-insensitive, per
    /// initiative) surfaces as a unique violation on `uq_donors_email`.
    pub async fn create(pool: &PgPool, input: &CreateDonor) -> Result<Donor, sqlx::Error> {
        let query = format!(
            "INSERT INTO donors (initiative_id, name, email, organization) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Donor>(&query)
            .bind(input.initiative_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.organization)
            .fetch_one(pool)
            .await
    }

    /// List all donors of an initiative, alphabetically.
    pub async fn list_by_initiative(
        pool: &PgPool,
        initiative_id: DbId,
    ) -> Result<Vec<Donor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM donors WHERE initiative_id = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, Donor>(&query)
            .bind(initiative_id)
            .fetch_all(pool)
            .await
    }

    /// Find a donor by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Donor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM donors WHERE id = $1");
        sqlx::query_as::<_, Donor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look a donor up by email, case-insensitively.
    pub async fn find_by_email(
        pool: &PgPool,
        initiative_id: DbId,
        email: &str,
    ) -> Result<Option<Donor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM donors \
             WHERE initiative_id = $1 AND lower(email) = lower($2)"
        );
        sqlx::query_as::<_, Donor>(&query)
            .bind(initiative_id)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Update a donor. Returns `None` if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDonor,
    ) -> Result<Option<Donor>, sqlx::Error> {
        let query = format!(
            "UPDATE donors SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                organization = COALESCE($4, organization), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Donor>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.organization)
            .fetch_optional(pool)
            .await
    }

    /// Delete a donor and, via cascade, their credit allocations.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM donors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
