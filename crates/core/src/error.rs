use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Unknown reference: {entity} with id {id}")]
    UnknownReference { entity: &'static str, id: DbId },

    #[error("Invalid temporal window: {0}")]
    InvalidWindow(String),

    #[error("Over-allocation: requested {requested}, only {available} available")]
    OverAllocation { requested: f64, available: f64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
