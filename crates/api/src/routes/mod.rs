pub mod claims;
pub mod credits;
pub mod dashboard;
pub mod donors;
pub mod evidence;
pub mod health;
pub mod initiatives;
pub mod locations;
pub mod metrics;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboard/summary                aggregate totals + cumulative series
///
/// /initiatives                      list, create
/// /initiatives/{id}                 get, update, delete
/// /initiatives/{id}/metrics         list metrics
/// /initiatives/{id}/donors          list donors
/// /initiatives/{id}/locations       list locations
/// /initiatives/{id}/evidence        list evidence
///
/// /metrics                          create
/// /metrics/{id}                     get, update, delete
/// /metrics/{id}/claims              list claims (effective-date order)
///
/// /claims                           create
/// /claims/{id}                      get, update, delete
/// /claims/{id}/evidence             list linked evidence
///
/// /donors                           create
/// /donors/{id}                      get, update, delete
/// /donors/{id}/credits              list the donor's allocations
///
/// /locations                        create
/// /locations/{id}                   get, update, delete
///
/// /evidence                         create
/// /evidence/{id}                    get (with link sets), update, delete
/// /evidence/{id}/coverage           coverage assessment for candidates
/// /evidence/{id}/claims             get linked claims, put replaces links
///
/// /credits                          list (by metric/claim scope), create
/// /credits/{id}                     update, delete
/// /credits/available                remaining capacity for a scope
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/dashboard", dashboard::router())
        .nest("/initiatives", initiatives::router())
        .nest("/metrics", metrics::router())
        .nest("/claims", claims::router())
        .nest("/donors", donors::router())
        .nest("/locations", locations::router())
        .nest("/evidence", evidence::router())
        .nest("/credits", credits::router())
}
