//! Impact claim entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tally_core::claim::ClaimObservation;
use tally_core::error::CoreError;
use tally_core::types::{DbId, Timestamp};
use tally_core::window::DateWindow;

/// A row from the `impact_claims` table.
///
/// The window is stored as the nullable column triple; a CHECK constraint
/// guarantees exactly one representation is present, and [`Self::window`]
/// is the only conversion point into the domain type.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImpactClaim {
    pub id: DbId,
    pub metric_id: DbId,
    pub value: f64,
    pub label: Option<String>,
    pub note: Option<String>,
    pub location_id: Option<DbId>,
    pub represented_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ImpactClaim {
    /// The claim's temporal window.
    pub fn window(&self) -> Result<DateWindow, CoreError> {
        DateWindow::from_parts(self.represented_date, self.period_start, self.period_end)
    }

    /// The engine-facing view of this row. A row whose stored window
    /// cannot be converted yields `window: None` and is excluded from
    /// aggregation and coverage rather than aborting the batch.
    pub fn observation(&self) -> ClaimObservation {
        ClaimObservation {
            id: self.id,
            metric_id: self.metric_id,
            value: self.value,
            window: self.window().ok(),
        }
    }
}

/// DTO for creating an impact claim.
#[derive(Debug, Deserialize)]
pub struct CreateImpactClaim {
    pub metric_id: DbId,
    pub value: f64,
    pub label: Option<String>,
    pub note: Option<String>,
    pub location_id: Option<DbId>,
    pub represented_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

impl CreateImpactClaim {
    /// Validate and build the window from the submitted date fields.
    pub fn window(&self) -> Result<DateWindow, CoreError> {
        DateWindow::from_parts(self.represented_date, self.period_start, self.period_end)
    }
}

/// DTO for updating an impact claim.
///
/// If any of the three window fields is present the triple replaces the
/// stored window wholesale (and must itself form a valid window);
/// otherwise the stored window is kept.
#[derive(Debug, Deserialize)]
pub struct UpdateImpactClaim {
    pub value: Option<f64>,
    pub label: Option<String>,
    pub note: Option<String>,
    pub location_id: Option<DbId>,
    pub represented_date: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

impl UpdateImpactClaim {
    /// Whether the request carries a replacement window.
    pub fn touches_window(&self) -> bool {
        self.represented_date.is_some() || self.period_start.is_some() || self.period_end.is_some()
    }

    /// Validate and build the replacement window.
    pub fn window(&self) -> Result<DateWindow, CoreError> {
        DateWindow::from_parts(self.represented_date, self.period_start, self.period_end)
    }
}
