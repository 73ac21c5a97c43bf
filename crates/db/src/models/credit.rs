//! Credit allocation entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tally_core::ledger::Allocation;
use tally_core::types::{DbId, Timestamp};

/// A row from the `credit_allocations` table.
///
/// `claim_id = NULL` denotes the metric-level pool spanning all of the
/// metric's claims.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditAllocation {
    pub id: DbId,
    pub donor_id: DbId,
    pub metric_id: DbId,
    pub claim_id: Option<DbId>,
    pub credited_value: f64,
    /// Informational share of the scope the donor was told they funded;
    /// never used in conservation math.
    pub credited_percent: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CreditAllocation {
    /// The ledger-facing view of this row.
    pub fn ledger_entry(&self) -> Allocation {
        Allocation {
            id: self.id,
            claim_id: self.claim_id,
            credited_value: self.credited_value,
        }
    }
}

/// DTO for proposing a new credit allocation.
#[derive(Debug, Deserialize)]
pub struct CreateCreditAllocation {
    pub donor_id: DbId,
    pub metric_id: DbId,
    pub claim_id: Option<DbId>,
    pub credited_value: f64,
    pub credited_percent: Option<f64>,
    pub notes: Option<String>,
}

/// DTO for updating an existing allocation. The donor, metric, and claim
/// scope are fixed at creation; only the credited amount and annotations
/// change.
#[derive(Debug, Deserialize)]
pub struct UpdateCreditAllocation {
    pub credited_value: Option<f64>,
    pub credited_percent: Option<f64>,
    pub notes: Option<String>,
}
