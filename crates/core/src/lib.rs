//! Pure impact-accounting logic: temporal windows, claim aggregation,
//! evidence coverage, credit-ledger arithmetic, and chart axis derivation.
//!
//! This crate performs no I/O and never reads the clock; callers supply
//! all claims, allocations, and the anchor date ("today") explicitly, so
//! every computation here is deterministic and repeatable.

pub mod aggregate;
pub mod claim;
pub mod coverage;
pub mod error;
pub mod ledger;
pub mod series;
pub mod types;
pub mod window;
