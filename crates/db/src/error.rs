//! Error type for repository operations that mix domain validation with
//! database access.
//!
//! Plain CRUD repositories return `sqlx::Error` directly; write paths
//! that enforce domain rules (window validity, conservation of credited
//! value) return [`DbError`] so callers can distinguish a rejected
//! proposal from an infrastructure failure.

use tally_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
