//! Initiative entity model: the ownership scope for all other entities.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tally_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `initiatives` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Initiative {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an initiative.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInitiative {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an initiative.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInitiative {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
}
