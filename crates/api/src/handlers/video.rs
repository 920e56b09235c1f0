//! Handlers for video submission and video CRUD.
//!
//! Submissions (single or bulk) are validated in full before anything is
//! written, missing durations are probed concurrently, and the whole batch
//! is persisted in one transaction.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use annotator_core::error::CoreError;
use annotator_core::probe::{lookup_or_none, DurationProbe};
use annotator_core::submission::{
    validate_batch, NewVideoGraph, SubmissionPayload, VideoSubmission,
};
use annotator_core::types::DbId;
use annotator_core::workflow::{validate_duration, validate_required_text, validate_video_status};
use annotator_db::models::status::StatusUpdate;
use annotator_db::models::video::{UpdateVideo, Video, VideoFilter};
use annotator_db::repositories::{SubmissionRepo, VideoRepo};
use annotator_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub videos_created: usize,
    pub queries_created: usize,
    pub annotations_created: usize,
    pub videos: Vec<Video>,
}

/// Verify that a video exists, returning 404 otherwise.
pub async fn ensure_video_exists(pool: &DbPool, id: DbId) -> AppResult<()> {
    if VideoRepo::exists(pool, id).await? {
        Ok(())
    } else {
        Err(CoreError::not_found("Video", id).into())
    }
}

/// Normalize an optional annotator filter: blank means "no filter".
pub(crate) fn annotator_filter(filter: &VideoFilter) -> Option<&str> {
    filter
        .annotator
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Fill in missing durations, running at most `limit` lookups at once.
///
/// Lookup failures leave the duration empty; they never fail the request.
pub(crate) async fn fill_durations(
    probe: &dyn DurationProbe,
    limit: usize,
    graphs: &mut [NewVideoGraph],
) {
    let lookups: Vec<_> = graphs
        .iter()
        .map(|graph| async move {
            match graph.duration {
                Some(known) => Some(known),
                None => lookup_or_none(probe, &graph.url).await,
            }
        })
        .collect();
    let durations: Vec<Option<i32>> = stream::iter(lookups)
        .buffered(limit.max(1))
        .collect()
        .await;

    for (graph, duration) in graphs.iter_mut().zip(durations) {
        graph.duration = duration;
    }
}

async fn create_submission(
    state: &AppState,
    videos: Vec<VideoSubmission>,
) -> AppResult<SubmissionResult> {
    let mut graphs = validate_batch(&videos).map_err(AppError::validation)?;
    fill_durations(
        state.probe.as_ref(),
        state.config.probe_concurrency,
        &mut graphs,
    )
    .await;

    let queries_created = graphs.iter().map(NewVideoGraph::query_count).sum();
    let annotations_created = graphs.iter().map(NewVideoGraph::annotation_count).sum();

    let created = SubmissionRepo::create_graphs(&state.pool, &graphs).await?;

    tracing::info!(
        videos = created.len(),
        queries = queries_created,
        annotations = annotations_created,
        "Videos submitted"
    );

    Ok(SubmissionResult {
        videos_created: created.len(),
        queries_created,
        annotations_created,
        videos: created,
    })
}

/// POST /videos
///
/// Submit one video object or an array of them, each with optional nested
/// queries and annotations.
pub async fn submit_videos(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmissionPayload>,
) -> AppResult<impl IntoResponse> {
    let result = create_submission(&state, payload.into_videos()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// POST /videos/bulk
///
/// Submit an array of videos. Same semantics as `POST /videos`.
pub async fn submit_bulk(
    State(state): State<AppState>,
    AppJson(videos): AppJson<Vec<VideoSubmission>>,
) -> AppResult<impl IntoResponse> {
    let result = create_submission(&state, videos).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /videos?annotator=
pub async fn list_videos(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<VideoFilter>,
) -> AppResult<impl IntoResponse> {
    let videos = VideoRepo::list(&state.pool, annotator_filter(&filter)).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// GET /videos/{id}
pub async fn get_video(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = VideoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Video", id))?;
    Ok(Json(DataResponse { data: video }))
}

fn validate_video_update(input: &UpdateVideo) -> Result<(), String> {
    if let Some(url) = &input.url {
        validate_required_text("url", url)?;
    }
    if let Some(title) = &input.title {
        validate_required_text("title", title)?;
    }
    if let Some(duration) = input.duration {
        validate_duration(duration)?;
    }
    if let Some(status) = &input.status {
        validate_video_status(status)?;
    }
    Ok(())
}

/// PUT /videos/{id}
///
/// Partial update: only supplied fields change.
pub async fn update_video(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateVideo>,
) -> AppResult<impl IntoResponse> {
    validate_video_update(&input).map_err(AppError::validation)?;

    let video = VideoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Video", id))?;

    tracing::info!(video_id = id, "Video updated");
    Ok(Json(DataResponse { data: video }))
}

/// PUT /videos/{id}/status
pub async fn update_video_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<StatusUpdate>,
) -> AppResult<impl IntoResponse> {
    validate_video_status(&input.status).map_err(AppError::validation)?;

    let video = VideoRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or_else(|| CoreError::not_found("Video", id))?;

    tracing::info!(video_id = id, status = %video.status, "Video status updated");
    Ok(Json(DataResponse { data: video }))
}

/// DELETE /videos/{id}
///
/// Removes the video with every query and annotation it owns.
pub async fn delete_video(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let summary = VideoRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Video", id))?;

    tracing::info!(
        video_id = id,
        queries_deleted = summary.queries_deleted,
        annotations_deleted = summary.annotations_deleted,
        "Video deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
