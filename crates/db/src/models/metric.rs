//! Metric entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tally_core::claim::{MetricCategory, MetricKind};
use tally_core::error::CoreError;
use tally_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `metrics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Metric {
    pub id: DbId,
    pub initiative_id: DbId,
    pub title: String,
    pub unit_label: String,
    /// One of `input` / `output` / `impact` (CHECK-constrained).
    pub category: String,
    /// One of `count` / `percentage` (CHECK-constrained).
    pub kind: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Metric {
    /// Typed view of the `kind` column.
    pub fn metric_kind(&self) -> Result<MetricKind, CoreError> {
        MetricKind::parse(&self.kind)
            .ok_or_else(|| CoreError::Internal(format!("unrecognized metric kind '{}'", self.kind)))
    }

    /// Typed view of the `category` column.
    pub fn metric_category(&self) -> Result<MetricCategory, CoreError> {
        MetricCategory::parse(&self.category).ok_or_else(|| {
            CoreError::Internal(format!("unrecognized metric category '{}'", self.category))
        })
    }
}

/// DTO for creating a metric.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMetric {
    pub initiative_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub unit_label: String,
    pub category: MetricCategory,
    pub kind: MetricKind,
}

/// DTO for updating a metric. The numeric kind is immutable after
/// creation; changing it would silently re-interpret existing claims.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMetric {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub unit_label: Option<String>,
    pub category: Option<MetricCategory>,
}
