//! Route definitions for annotations.
//!
//! Mounted at `/annotations`.
//!
//! ```text
//! GET    /{id}              get_annotation
//! PUT    /{id}              update_annotation
//! DELETE /{id}              delete_annotation
//! PUT    /{id}/annotated    update_annotated_flag
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(annotation::get_annotation)
                .put(annotation::update_annotation)
                .delete(annotation::delete_annotation),
        )
        .route("/{id}/annotated", put(annotation::update_annotated_flag))
}
