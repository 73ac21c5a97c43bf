//! Repository for the `locations` table.

use sqlx::PgPool;
use tally_core::types::DbId;

use crate::models::location::{CreateLocation, Location, UpdateLocation};

/// Column list for `locations` SELECT queries.
const COLUMNS: &str = "id, initiative_id, name, latitude, longitude, created_at, updated_at";

/// Provides query operations for locations.
pub struct LocationRepo;

impl LocationRepo {
    /// Insert a new location.
    pub async fn create(pool: &PgPool, input: &CreateLocation) -> Result<Location, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (initiative_id, name, latitude, longitude) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(input.initiative_id)
            .bind(&input.name)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_one(pool)
            .await
    }

    /// List all locations of an initiative, alphabetically.
    pub async fn list_by_initiative(
        pool: &PgPool,
        initiative_id: DbId,
    ) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locations WHERE initiative_id = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(initiative_id)
            .fetch_all(pool)
            .await
    }

    /// Find a location by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE id = $1");
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a location. Returns `None` if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLocation,
    ) -> Result<Option<Location>, sqlx::Error> {
        let query = format!(
            "UPDATE locations SET \
                name = COALESCE($2, name), \
                latitude = COALESCE($3, latitude), \
                longitude = COALESCE($4, longitude), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_optional(pool)
            .await
    }

    /// Delete a location. Claims referencing it fall back to no location.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
