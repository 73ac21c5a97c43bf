//! Location entity model. Locations are referenced by claims and
//! evidence and used as an aggregation filter; map rendering itself
//! lives entirely client-side.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tally_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `locations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: DbId,
    pub initiative_id: DbId,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a location.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocation {
    pub initiative_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// DTO for updating a location.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocation {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}
