//! Route definitions for metrics.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{claims, metrics};
use crate::state::AppState;

/// Metric routes mounted at `/metrics`.
///
/// ```text
/// POST   /              -> create
/// GET    /{id}          -> get
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete (cascades to claims and credits)
/// GET    /{id}/claims   -> claims in effective-date order
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(metrics::create))
        .route(
            "/{id}",
            get(metrics::get).put(metrics::update).delete(metrics::delete),
        )
        .route("/{id}/claims", get(claims::list_for_metric))
}
