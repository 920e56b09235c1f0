//! Route definitions for video submission and video CRUD.
//!
//! Mounted at `/videos`.
//!
//! ```text
//! POST   /                   submit_videos (one object or an array)
//! GET    /                   list_videos (?annotator=)
//! POST   /bulk               submit_bulk
//! GET    /{id}               get_video
//! PUT    /{id}               update_video
//! DELETE /{id}               delete_video
//! PUT    /{id}/status        update_video_status
//! POST   /{id}/queries       create_query
//! GET    /{id}/queries       list_queries
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{query, video};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(video::submit_videos).get(video::list_videos))
        .route("/bulk", post(video::submit_bulk))
        .route(
            "/{id}",
            get(video::get_video)
                .put(video::update_video)
                .delete(video::delete_video),
        )
        .route("/{id}/status", put(video::update_video_status))
        .route(
            "/{id}/queries",
            post(query::create_query).get(query::list_queries),
        )
}
