//! Handlers for timestamped annotations on a query.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use annotator_core::error::CoreError;
use annotator_core::submission::{validate_annotation, AnnotationSubmission};
use annotator_core::timestamp::validate_timestamp;
use annotator_core::types::DbId;
use annotator_core::workflow::validate_annotation_flag;
use annotator_db::models::annotation::UpdateAnnotation;
use annotator_db::models::status::AnnotatedFlagUpdate;
use annotator_db::repositories::AnnotationRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::query::ensure_query_exists;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_annotation_update(input: &UpdateAnnotation) -> Result<(), String> {
    if let Some(start) = &input.start_timestamp {
        validate_timestamp("start_timestamp", start)?;
    }
    if let Some(end) = &input.end_timestamp {
        validate_timestamp("end_timestamp", end)?;
    }
    if let Some(flag) = &input.is_annotated {
        validate_annotation_flag(flag)?;
    }
    Ok(())
}

/// POST /queries/{id}/annotations
///
/// Missing timestamps default to `00:00:00`; `is_annotated` defaults to
/// `unannotated`.
pub async fn create_annotation(
    State(state): State<AppState>,
    AppPath(query_id): AppPath<DbId>,
    AppJson(input): AppJson<AnnotationSubmission>,
) -> AppResult<impl IntoResponse> {
    ensure_query_exists(&state.pool, query_id).await?;
    let new_annotation = validate_annotation(&input).map_err(AppError::validation)?;

    let annotation = AnnotationRepo::create(&state.pool, query_id, &new_annotation).await?;

    tracing::info!(
        query_id = query_id,
        annotation_id = annotation.id,
        start = %annotation.start_timestamp,
        end = %annotation.end_timestamp,
        "Annotation created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: annotation })))
}

/// GET /queries/{id}/annotations
pub async fn list_annotations(
    State(state): State<AppState>,
    AppPath(query_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_query_exists(&state.pool, query_id).await?;
    let annotations = AnnotationRepo::list_by_query(&state.pool, query_id).await?;
    Ok(Json(DataResponse { data: annotations }))
}

/// GET /annotations/{id}
pub async fn get_annotation(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let annotation = AnnotationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Annotation", id))?;
    Ok(Json(DataResponse { data: annotation }))
}

/// PUT /annotations/{id}
pub async fn update_annotation(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateAnnotation>,
) -> AppResult<impl IntoResponse> {
    validate_annotation_update(&input).map_err(AppError::validation)?;

    let annotation = AnnotationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Annotation", id))?;

    tracing::info!(annotation_id = id, "Annotation updated");
    Ok(Json(DataResponse { data: annotation }))
}

/// PUT /annotations/{id}/annotated
pub async fn update_annotated_flag(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AnnotatedFlagUpdate>,
) -> AppResult<impl IntoResponse> {
    validate_annotation_flag(&input.is_annotated).map_err(AppError::validation)?;

    let annotation = AnnotationRepo::set_annotated(&state.pool, id, &input.is_annotated)
        .await?
        .ok_or_else(|| CoreError::not_found("Annotation", id))?;

    tracing::info!(
        annotation_id = id,
        is_annotated = %annotation.is_annotated,
        "Annotation flag updated"
    );
    Ok(Json(DataResponse { data: annotation }))
}

/// DELETE /annotations/{id}
pub async fn delete_annotation(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if !AnnotationRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Annotation", id).into());
    }

    tracing::info!(annotation_id = id, "Annotation deleted");
    Ok(StatusCode::NO_CONTENT)
}
