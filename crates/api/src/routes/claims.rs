//! Route definitions for impact claims.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{claims, evidence};
use crate::state::AppState;

/// Claim routes mounted at `/claims`.
///
/// ```text
/// POST   /                -> create
/// GET    /{id}            -> get
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/evidence   -> evidence items linked to the claim
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(claims::create))
        .route(
            "/{id}",
            get(claims::get).put(claims::update).delete(claims::delete),
        )
        .route("/{id}/evidence", get(evidence::list_for_claim))
}
