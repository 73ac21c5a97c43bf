//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Rows storing a temporal window carry the nullable
//! `represented_date` / `period_start` / `period_end` column triple;
//! conversion to the domain [`tally_core::window::DateWindow`] happens
//! here, at the model edge, and nowhere else.

pub mod claim;
pub mod credit;
pub mod donor;
pub mod evidence;
pub mod initiative;
pub mod location;
pub mod metric;
