//! Route definitions for initiatives and their scoped listings.

use axum::routing::get;
use axum::Router;

use crate::handlers::{donors, evidence, initiatives, locations, metrics};
use crate::state::AppState;

/// Initiative routes mounted at `/initiatives`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{id}              -> get
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// GET    /{id}/metrics      -> metrics of the initiative
/// GET    /{id}/donors       -> donors of the initiative
/// GET    /{id}/locations    -> locations of the initiative
/// GET    /{id}/evidence     -> evidence items of the initiative
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(initiatives::list).post(initiatives::create))
        .route(
            "/{id}",
            get(initiatives::get)
                .put(initiatives::update)
                .delete(initiatives::delete),
        )
        .route("/{id}/metrics", get(metrics::list_for_initiative))
        .route("/{id}/donors", get(donors::list_for_initiative))
        .route("/{id}/locations", get(locations::list_for_initiative))
        .route("/{id}/evidence", get(evidence::list_for_initiative))
}
