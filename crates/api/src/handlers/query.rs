//! Handlers for queries: creation under a video, CRUD, workflow status and
//! query-type set editing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use annotator_core::error::CoreError;
use annotator_core::submission::{validate_query, QuerySubmission};
use annotator_core::types::DbId;
use annotator_core::workflow::{
    normalize_query_types, remove_query_type, validate_query_status, validate_query_type,
    validate_required_text,
};
use annotator_db::models::query::{QueryTypeInput, UpdateQuery};
use annotator_db::models::status::StatusUpdate;
use annotator_db::repositories::{QueryChanges, QueryRepo};
use annotator_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::video::ensure_video_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify that a query exists, returning 404 otherwise.
pub async fn ensure_query_exists(pool: &DbPool, id: DbId) -> AppResult<()> {
    if QueryRepo::exists(pool, id).await? {
        Ok(())
    } else {
        Err(CoreError::not_found("Query", id).into())
    }
}

/// Turn a raw update body into validated changes.
fn validate_query_update(input: UpdateQuery) -> Result<QueryChanges, String> {
    if let Some(text) = &input.query_text {
        validate_required_text("query_text", text)?;
    }
    if let Some(status) = &input.status {
        validate_query_status(status)?;
    }
    let query_types = input
        .query_types
        .as_deref()
        .map(normalize_query_types)
        .transpose()?;

    Ok(QueryChanges {
        query_text: input.query_text,
        query_types,
        status: input.status,
    })
}

/// POST /videos/{id}/queries
///
/// Create a query (optionally with nested annotations) under a video.
pub async fn create_query(
    State(state): State<AppState>,
    AppPath(video_id): AppPath<DbId>,
    AppJson(input): AppJson<QuerySubmission>,
) -> AppResult<impl IntoResponse> {
    ensure_video_exists(&state.pool, video_id).await?;
    let new_query = validate_query(&input).map_err(AppError::validation)?;

    let query = QueryRepo::create(&state.pool, video_id, &new_query).await?;

    tracing::info!(
        video_id = video_id,
        query_id = query.id,
        annotations = new_query.annotations.len(),
        "Query created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: query })))
}

/// GET /videos/{id}/queries
pub async fn list_queries(
    State(state): State<AppState>,
    AppPath(video_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_video_exists(&state.pool, video_id).await?;
    let queries = QueryRepo::list_by_video(&state.pool, video_id).await?;
    Ok(Json(DataResponse { data: queries }))
}

/// GET /queries/{id}
pub async fn get_query(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let query = QueryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Query", id))?;
    Ok(Json(DataResponse { data: query }))
}

/// PUT /queries/{id}
///
/// Partial update of text, type set and status.
pub async fn update_query(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateQuery>,
) -> AppResult<impl IntoResponse> {
    let changes = validate_query_update(input).map_err(AppError::validation)?;

    let query = QueryRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| CoreError::not_found("Query", id))?;

    tracing::info!(query_id = id, "Query updated");
    Ok(Json(DataResponse { data: query }))
}

/// PUT /queries/{id}/status
pub async fn update_query_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<StatusUpdate>,
) -> AppResult<impl IntoResponse> {
    validate_query_status(&input.status).map_err(AppError::validation)?;

    let query = QueryRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or_else(|| CoreError::not_found("Query", id))?;

    tracing::info!(query_id = id, status = %query.status, "Query status updated");
    Ok(Json(DataResponse { data: query }))
}

/// POST /queries/{id}/types
///
/// Add one type to the set. Adding a type already present is a no-op.
pub async fn add_query_type(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<QueryTypeInput>,
) -> AppResult<impl IntoResponse> {
    validate_query_type(&input.query_type).map_err(AppError::validation)?;

    let query = QueryRepo::add_type(&state.pool, id, &input.query_type)
        .await?
        .ok_or_else(|| CoreError::not_found("Query", id))?;

    tracing::info!(query_id = id, query_type = %input.query_type, "Query type added");
    Ok(Json(DataResponse { data: query }))
}

/// DELETE /queries/{id}/types/{type}
///
/// Remove one type from the set. Removing the last remaining type, or a
/// type the query does not carry, is rejected and nothing changes.
pub async fn remove_query_type_handler(
    State(state): State<AppState>,
    AppPath((id, query_type)): AppPath<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    validate_query_type(&query_type).map_err(AppError::validation)?;

    if let Some(query) = QueryRepo::remove_type(&state.pool, id, &query_type).await? {
        tracing::info!(query_id = id, query_type = %query_type, "Query type removed");
        return Ok(Json(DataResponse { data: query }));
    }

    // The guarded update matched nothing: report why.
    let current = QueryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Query", id))?;
    match remove_query_type(&current.query_types, &query_type) {
        Err(msg) => Err(AppError::validation(msg)),
        Ok(_) => Err(CoreError::Conflict(format!(
            "Query {id} changed while removing '{query_type}', retry the request"
        ))
        .into()),
    }
}

/// DELETE /queries/{id}
///
/// Removes the query with all of its annotations.
pub async fn delete_query(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let annotations_deleted = QueryRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Query", id))?;

    tracing::info!(query_id = id, annotations_deleted, "Query deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_normalizes_types() {
        let changes = validate_query_update(UpdateQuery {
            query_types: Some(vec!["causal".into(), "static".into(), "causal".into()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            changes.query_types,
            Some(vec!["causal".to_string(), "static".to_string()])
        );
        assert_eq!(changes.status, None);
    }

    #[test]
    fn update_rejects_empty_types_and_legacy_status() {
        assert!(validate_query_update(UpdateQuery {
            query_types: Some(vec![]),
            ..Default::default()
        })
        .is_err());
        assert!(validate_query_update(UpdateQuery {
            status: Some("pending".into()),
            ..Default::default()
        })
        .is_err());
        assert!(validate_query_update(UpdateQuery {
            query_text: Some("".into()),
            ..Default::default()
        })
        .is_err());
    }
}
