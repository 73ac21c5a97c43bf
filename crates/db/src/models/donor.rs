//! Donor entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tally_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `donors` table. Emails are unique per initiative,
/// case-insensitively (enforced by the `uq_donors_email` index on
/// `lower(email)`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Donor {
    pub id: DbId,
    pub initiative_id: DbId,
    pub name: String,
    pub email: String,
    pub organization: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a donor.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDonor {
    pub initiative_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 200))]
    pub organization: Option<String>,
}

/// DTO for updating a donor.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDonor {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 200))]
    pub organization: Option<String>,
}
