//! Route definitions for credit allocations.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::credits;
use crate::state::AppState;

/// Credit allocation routes mounted at `/credits`.
///
/// ```text
/// GET    /            -> list by metric scope (?metric_id=&claim_id=)
/// POST   /            -> propose (409 with available amount on over-allocation)
/// GET    /available   -> remaining capacity for a claim or pool scope
/// PUT    /{id}        -> update credited value / annotations
/// DELETE /{id}        -> delete (always frees capacity)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(credits::list).post(credits::propose))
        .route("/available", get(credits::available))
        .route("/{id}", put(credits::update).delete(credits::delete))
}
