//! Route definitions for queries.
//!
//! Mounted at `/queries`.
//!
//! ```text
//! GET    /{id}                      get_query
//! PUT    /{id}                      update_query
//! DELETE /{id}                      delete_query
//! PUT    /{id}/status               update_query_status
//! POST   /{id}/types                add_query_type
//! DELETE /{id}/types/{query_type}   remove_query_type_handler
//! POST   /{id}/annotations          create_annotation
//! GET    /{id}/annotations          list_annotations
//! ```

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{annotation, query};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(query::get_query)
                .put(query::update_query)
                .delete(query::delete_query),
        )
        .route("/{id}/status", put(query::update_query_status))
        .route("/{id}/types", post(query::add_query_type))
        .route(
            "/{id}/types/{query_type}",
            delete(query::remove_query_type_handler),
        )
        .route(
            "/{id}/annotations",
            post(annotation::create_annotation).get(annotation::list_annotations),
        )
}
