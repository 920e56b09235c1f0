pub mod annotation;
pub mod export;
pub mod health;
pub mod home;
pub mod query;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /videos                              submit (one or many), list
/// /videos/bulk                         submit many
/// /videos/{id}                         get, update, delete (cascade)
/// /videos/{id}/status                  status update
/// /videos/{id}/queries                 create, list
///
/// /queries/{id}                        get, update, delete (cascade)
/// /queries/{id}/status                 status update
/// /queries/{id}/types                  add a type
/// /queries/{id}/types/{query_type}     remove a type
/// /queries/{id}/annotations            create, list
///
/// /annotations/{id}                    get, update, delete
/// /annotations/{id}/annotated          flag update
///
/// /export                              nested export document
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/videos", video::router())
        .nest("/queries", query::router())
        .nest("/annotations", annotation::router())
        .nest("/export", export::router())
}
