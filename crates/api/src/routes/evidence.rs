//! Route definitions for evidence items.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::evidence;
use crate::state::AppState;

/// Evidence routes mounted at `/evidence`.
///
/// ```text
/// POST   /                  -> create (with initial metric/location links)
/// GET    /{id}              -> get with link sets
/// PUT    /{id}              -> update own fields
/// DELETE /{id}              -> delete
/// GET    /{id}/coverage     -> coverage assessment for candidate claims
/// GET    /{id}/claims       -> claims the evidence is linked to
/// PUT    /{id}/claims       -> replace the claim link set
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(evidence::create))
        .route(
            "/{id}",
            get(evidence::get)
                .put(evidence::update)
                .delete(evidence::delete),
        )
        .route("/{id}/coverage", get(evidence::coverage))
        .route(
            "/{id}/claims",
            get(evidence::list_claims).put(evidence::set_claims),
        )
}
