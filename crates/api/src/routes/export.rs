//! Route definitions for the export document. Mounted at `/export`.

use axum::routing::get;
use axum::Router;

use crate::handlers::export;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(export::export_annotations))
}
