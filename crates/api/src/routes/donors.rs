//! Route definitions for donors.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{credits, donors};
use crate::state::AppState;

/// Donor routes mounted at `/donors`.
///
/// ```text
/// POST   /                -> create
/// GET    /{id}            -> get
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete (cascades to the donor's credits)
/// GET    /{id}/credits    -> the donor's credit allocations
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(donors::create))
        .route(
            "/{id}",
            get(donors::get).put(donors::update).delete(donors::delete),
        )
        .route("/{id}/credits", get(credits::list_for_donor))
}
