//! Handler for the nested export document.

use axum::extract::State;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::Json;

use annotator_core::export::{export_file_name, stats};
use annotator_db::models::video::VideoFilter;
use annotator_db::repositories::ExportRepo;

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::handlers::video::annotator_filter;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /export?annotator=
///
/// Every video (optionally one annotator's) with its queries and
/// annotations, read from a single snapshot. The body is a valid
/// submission payload. A `Content-Disposition` header suggests a file name.
pub async fn export_annotations(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<VideoFilter>,
) -> AppResult<impl IntoResponse> {
    let annotator = annotator_filter(&filter);
    let document = ExportRepo::export(&state.pool, annotator).await?;

    let counts = stats(&document);
    tracing::info!(
        annotator = annotator.unwrap_or("all"),
        videos = counts.videos,
        queries = counts.queries,
        annotations = counts.annotations,
        "Annotations exported"
    );

    let file_name = export_file_name(annotator, chrono::Utc::now().date_naive());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [(CONTENT_DISPOSITION, disposition)],
        Json(DataResponse { data: document }),
    ))
}
