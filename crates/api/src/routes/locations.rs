//! Route definitions for locations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::locations;
use crate::state::AppState;

/// Location routes mounted at `/locations`.
///
/// ```text
/// POST   /        -> create
/// GET    /{id}    -> get
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete (claims fall back to no location)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(locations::create)).route(
        "/{id}",
        get(locations::get)
            .put(locations::update)
            .delete(locations::delete),
    )
}
