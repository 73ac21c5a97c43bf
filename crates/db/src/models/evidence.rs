//! Evidence item entity model and DTOs.
//!
//! Evidence carries its own temporal window plus explicit, user-curated
//! link sets: the metrics it supports, the locations it covers, and the
//! claims it is attached to. Claim links are never derived from dates
//! alone; coverage assessment only informs the default selection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tally_core::error::CoreError;
use tally_core::types::{DbId, Timestamp};
use tally_core::window::DateWindow;

/// A row from the `evidence_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EvidenceItem {
    pub id: DbId,
    pub initiative_id: DbId,
    /// One of `visual` / `document` / `testimony` / `financial`
    /// (CHECK-constrained).
    pub kind: String,
    /// Opaque reference into the file store; upload plumbing lives
    /// outside this service.
    pub file_ref: Option<String>,
    pub description: Option<String>,
    pub represented_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EvidenceItem {
    /// The evidence item's temporal window.
    pub fn window(&self) -> Result<DateWindow, CoreError> {
        DateWindow::from_parts(self.represented_date, self.period_start, self.period_end)
    }
}

/// Evidence row plus its link sets, as returned by detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceDetail {
    #[serde(flatten)]
    pub item: EvidenceItem,
    pub metric_ids: Vec<DbId>,
    pub location_ids: Vec<DbId>,
    pub claim_ids: Vec<DbId>,
}

/// DTO for creating an evidence item with its initial metric and
/// location links. Claim links are set separately, after the user has
/// reviewed the coverage assessment.
#[derive(Debug, Deserialize)]
pub struct CreateEvidenceItem {
    pub initiative_id: DbId,
    pub kind: String,
    pub file_ref: Option<String>,
    pub description: Option<String>,
    pub represented_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub metric_ids: Vec<DbId>,
    #[serde(default)]
    pub location_ids: Vec<DbId>,
}

impl CreateEvidenceItem {
    /// Validate and build the window from the submitted date fields.
    pub fn window(&self) -> Result<DateWindow, CoreError> {
        DateWindow::from_parts(self.represented_date, self.period_start, self.period_end)
    }
}

/// DTO for updating an evidence item's own fields. Link sets have their
/// own endpoints.
#[derive(Debug, Deserialize)]
pub struct UpdateEvidenceItem {
    pub kind: Option<String>,
    pub file_ref: Option<String>,
    pub description: Option<String>,
    pub represented_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

impl UpdateEvidenceItem {
    /// Whether the request carries a replacement window.
    pub fn touches_window(&self) -> bool {
        self.represented_date.is_some() || self.period_start.is_some() || self.period_end.is_some()
    }

    /// Validate and build the replacement window.
    pub fn window(&self) -> Result<DateWindow, CoreError> {
        DateWindow::from_parts(self.represented_date, self.period_start, self.period_end)
    }
}
