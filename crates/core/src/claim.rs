//! Claim and metric domain types plus creation-time validation (PRD-08).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;
use crate::window::DateWindow;

/// Upper bound for percentage-kind metric values.
pub const PERCENTAGE_MAX: f64 = 100.0;

// ---------------------------------------------------------------------------
// Metric enums
// ---------------------------------------------------------------------------

/// Numeric kind of a metric: a plain count or a 0-100 percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Count,
    Percentage,
}

impl MetricKind {
    /// Stable string form used in the database `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Percentage => "percentage",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "count" => Some(Self::Count),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Position of a metric in the input -> output -> impact chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Input,
    Output,
    Impact,
}

impl MetricCategory {
    /// Stable string form used in the database `category` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Impact => "impact",
        }
    }

    /// Parse the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "input" => Some(Self::Input),
            "output" => Some(Self::Output),
            "impact" => Some(Self::Impact),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Claim observation
// ---------------------------------------------------------------------------

/// The slice of an impact claim the engine needs: identity, metric, value,
/// and temporal window.
///
/// `window` is `None` when the stored row could not be converted to a valid
/// [`DateWindow`]. Such claims are excluded from aggregation and coverage
/// and reported separately, so one malformed record never hides a whole
/// dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimObservation {
    pub id: DbId,
    pub metric_id: DbId,
    pub value: f64,
    pub window: Option<DateWindow>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a claim value against its metric's numeric kind.
///
/// Values are non-negative; percentage metrics are additionally capped at
/// [`PERCENTAGE_MAX`].
pub fn validate_claim_value(value: f64, kind: MetricKind) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "claim value must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(CoreError::Validation(format!(
            "claim value must be non-negative, got {value}"
        )));
    }
    if kind == MetricKind::Percentage && value > PERCENTAGE_MAX {
        return Err(CoreError::Validation(format!(
            "percentage claim value must be at most {PERCENTAGE_MAX}, got {value}"
        )));
    }
    Ok(())
}
