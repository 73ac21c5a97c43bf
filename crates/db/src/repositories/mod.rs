//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Plain CRUD returns
//! `sqlx::Error`; write paths that enforce domain rules return
//! [`crate::error::DbError`].

mod conservation;

pub mod claim_repo;
pub mod credit_repo;
pub mod donor_repo;
pub mod evidence_repo;
pub mod initiative_repo;
pub mod location_repo;
pub mod metric_repo;

pub use claim_repo::ClaimRepo;
pub use credit_repo::CreditRepo;
pub use donor_repo::DonorRepo;
pub use evidence_repo::EvidenceRepo;
pub use initiative_repo::InitiativeRepo;
pub use location_repo::LocationRepo;
pub use metric_repo::MetricRepo;
