//! In-memory [`AnnotationApi`] for unit tests.
//!
//! Applies the same validation rules as the server (through
//! `annotator_core`) and reports failures as [`ClientError::Api`] with the
//! server's status codes.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use annotator_core::export::ExportDocument;
use annotator_core::submission::{
    validate_annotation, validate_batch, validate_query, AnnotationSubmission, NewQuery,
    QuerySubmission, VideoSubmission,
};
use annotator_core::timestamp::validate_timestamp;
use annotator_core::types::DbId;
use annotator_core::workflow::{
    add_query_type, normalize_query_types, remove_query_type, validate_annotation_flag,
    validate_query_status, validate_required_text, validate_video_status,
};

use crate::api::AnnotationApi;
use crate::error::ClientError;
use crate::models::{
    Annotation, AnnotationUpdate, Query, QueryUpdate, SubmissionResult, Video, VideoUpdate,
};

#[derive(Default)]
struct FakeState {
    next_id: DbId,
    videos: Vec<Video>,
    queries: Vec<Query>,
    annotations: Vec<Annotation>,
    fail_next: Option<u16>,
    calls: Vec<String>,
}

impl FakeState {
    fn id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn insert_query(&mut self, video_id: DbId, input: &NewQuery) -> Query {
        let now = Utc::now();
        let query = Query {
            id: self.id(),
            video_id,
            query_text: input.query_text.clone(),
            status: input.status.clone(),
            query_types: input.query_types.clone(),
            created_at: now,
            updated_at: now,
            annotation_count: None,
        };
        self.queries.push(query.clone());
        for annotation in &input.annotations {
            let id = self.id();
            self.annotations.push(Annotation {
                id,
                query_id: query.id,
                start_timestamp: annotation.start_timestamp.clone(),
                end_timestamp: annotation.end_timestamp.clone(),
                notes: annotation.notes.clone(),
                is_annotated: annotation.is_annotated.clone(),
                created_at: now,
                updated_at: now,
            });
        }
        query
    }

    fn video_with_count(&self, video: &Video) -> Video {
        let count = self.queries.iter().filter(|q| q.video_id == video.id).count();
        Video {
            query_count: Some(count as i64),
            ..video.clone()
        }
    }

    fn query_with_count(&self, query: &Query) -> Query {
        let count = self
            .annotations
            .iter()
            .filter(|a| a.query_id == query.id)
            .count();
        Query {
            annotation_count: Some(count as i64),
            ..query.clone()
        }
    }

    fn video_mut(&mut self, id: DbId) -> Result<&mut Video, ClientError> {
        self.videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| not_found("Video", id))
    }

    fn query_mut(&mut self, id: DbId) -> Result<&mut Query, ClientError> {
        self.queries
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| not_found("Query", id))
    }

    fn annotation_mut(&mut self, id: DbId) -> Result<&mut Annotation, ClientError> {
        self.annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Annotation", id))
    }

    fn remove_query_graph(&mut self, query_id: DbId) {
        self.annotations.retain(|a| a.query_id != query_id);
        self.queries.retain(|q| q.id != query_id);
    }
}

fn not_found(entity: &str, id: DbId) -> ClientError {
    ClientError::Api {
        status: 404,
        code: "NOT_FOUND".into(),
        message: format!("{entity} with id {id} not found"),
    }
}

fn invalid(message: String) -> ClientError {
    ClientError::Api {
        status: 400,
        code: "VALIDATION_ERROR".into(),
        message,
    }
}

/// In-memory stand-in for the REST API.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    /// Record a call and fail it if a failure was armed.
    fn enter(&self, call: &str) -> Result<std::sync::MutexGuard<'_, FakeState>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        if let Some(status) = state.fail_next.take() {
            return Err(ClientError::Api {
                status,
                code: "INTERNAL_ERROR".into(),
                message: "An internal error occurred".into(),
            });
        }
        Ok(state)
    }

    /// Make the next call fail with `status`.
    pub fn fail_next_with(&self, status: u16) {
        self.state.lock().unwrap().fail_next = Some(status);
    }

    /// Names of the calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn video_count(&self) -> usize {
        self.state.lock().unwrap().videos.len()
    }

    pub fn seed_video(&self, url: &str, title: &str, annotator: Option<&str>) -> DbId {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let id = state.id();
        state.videos.push(Video {
            id,
            url: url.into(),
            title: title.into(),
            annotator: annotator.map(str::to_string),
            description: None,
            topic: None,
            duration: None,
            notes: None,
            status: "pending".into(),
            created_at: now,
            updated_at: now,
            query_count: None,
        });
        id
    }

    pub fn set_duration(&self, video_id: DbId, duration: Option<i32>) {
        let mut state = self.state.lock().unwrap();
        if let Ok(video) = state.video_mut(video_id) {
            video.duration = duration;
        }
    }

    pub fn seed_query(&self, video_id: DbId, text: &str) -> DbId {
        let input = validate_query(&QuerySubmission {
            query_text: Some(text.into()),
            ..Default::default()
        })
        .unwrap();
        self.state.lock().unwrap().insert_query(video_id, &input).id
    }

    pub fn seed_annotation(&self, query_id: DbId, start: &str, end: &str) -> DbId {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let id = state.id();
        state.annotations.push(Annotation {
            id,
            query_id,
            start_timestamp: start.into(),
            end_timestamp: end.into(),
            notes: None,
            is_annotated: "unannotated".into(),
            created_at: now,
            updated_at: now,
        });
        id
    }
}

#[async_trait]
impl AnnotationApi for FakeApi {
    async fn submit_video(&self, video: &VideoSubmission) -> Result<SubmissionResult, ClientError> {
        self.submit_bulk(std::slice::from_ref(video)).await
    }

    async fn submit_bulk(
        &self,
        videos: &[VideoSubmission],
    ) -> Result<SubmissionResult, ClientError> {
        let mut state = self.enter("submit")?;
        let graphs = validate_batch(videos).map_err(invalid)?;

        let mut created = Vec::with_capacity(graphs.len());
        let mut queries_created = 0;
        let mut annotations_created = 0;
        for graph in &graphs {
            let now = Utc::now();
            let video = Video {
                id: state.id(),
                url: graph.url.clone(),
                title: graph.title.clone(),
                annotator: graph.annotator.clone(),
                description: graph.description.clone(),
                topic: graph.topic.clone(),
                duration: graph.duration,
                notes: graph.notes.clone(),
                status: graph.status.clone(),
                created_at: now,
                updated_at: now,
                query_count: None,
            };
            state.videos.push(video.clone());
            for query in &graph.queries {
                state.insert_query(video.id, query);
            }
            queries_created += graph.query_count();
            annotations_created += graph.annotation_count();
            created.push(video);
        }

        Ok(SubmissionResult {
            videos_created: created.len(),
            queries_created,
            annotations_created,
            videos: created,
        })
    }

    async fn list_videos(&self, annotator: Option<&str>) -> Result<Vec<Video>, ClientError> {
        let state = self.enter("list_videos")?;
        Ok(state
            .videos
            .iter()
            .filter(|v| annotator.is_none() || v.annotator.as_deref() == annotator)
            .map(|v| state.video_with_count(v))
            .collect())
    }

    async fn get_video(&self, id: DbId) -> Result<Video, ClientError> {
        let state = self.enter("get_video")?;
        state
            .videos
            .iter()
            .find(|v| v.id == id)
            .map(|v| state.video_with_count(v))
            .ok_or_else(|| not_found("Video", id))
    }

    async fn update_video(&self, id: DbId, changes: &VideoUpdate) -> Result<Video, ClientError> {
        let mut state = self.enter("update_video")?;
        if let Some(title) = &changes.title {
            validate_required_text("title", title).map_err(invalid)?;
        }
        if let Some(status) = &changes.status {
            validate_video_status(status).map_err(invalid)?;
        }
        let video = state.video_mut(id)?;
        if let Some(title) = &changes.title {
            video.title = title.clone();
        }
        if let Some(notes) = &changes.notes {
            video.notes = Some(notes.clone());
        }
        if let Some(topic) = &changes.topic {
            video.topic = Some(topic.clone());
        }
        if let Some(status) = &changes.status {
            video.status = status.clone();
        }
        Ok(video.clone())
    }

    async fn set_video_status(&self, id: DbId, status: &str) -> Result<Video, ClientError> {
        let mut state = self.enter("set_video_status")?;
        validate_video_status(status).map_err(invalid)?;
        let video = state.video_mut(id)?;
        video.status = status.to_string();
        Ok(video.clone())
    }

    async fn delete_video(&self, id: DbId) -> Result<(), ClientError> {
        let mut state = self.enter("delete_video")?;
        state.video_mut(id)?;
        let query_ids: Vec<DbId> = state
            .queries
            .iter()
            .filter(|q| q.video_id == id)
            .map(|q| q.id)
            .collect();
        for query_id in query_ids {
            state.remove_query_graph(query_id);
        }
        state.videos.retain(|v| v.id != id);
        Ok(())
    }

    async fn create_query(
        &self,
        video_id: DbId,
        query: &QuerySubmission,
    ) -> Result<Query, ClientError> {
        let mut state = self.enter("create_query")?;
        state.video_mut(video_id)?;
        let input = validate_query(query).map_err(invalid)?;
        Ok(state.insert_query(video_id, &input))
    }

    async fn list_queries(&self, video_id: DbId) -> Result<Vec<Query>, ClientError> {
        let mut state = self.enter("list_queries")?;
        state.video_mut(video_id)?;
        Ok(state
            .queries
            .iter()
            .filter(|q| q.video_id == video_id)
            .map(|q| state.query_with_count(q))
            .collect())
    }

    async fn update_query(&self, id: DbId, changes: &QueryUpdate) -> Result<Query, ClientError> {
        let mut state = self.enter("update_query")?;
        if let Some(text) = &changes.query_text {
            validate_required_text("query_text", text).map_err(invalid)?;
        }
        if let Some(status) = &changes.status {
            validate_query_status(status).map_err(invalid)?;
        }
        let types = changes
            .query_types
            .as_deref()
            .map(normalize_query_types)
            .transpose()
            .map_err(invalid)?;
        let query = state.query_mut(id)?;
        if let Some(text) = &changes.query_text {
            query.query_text = text.clone();
        }
        if let Some(types) = types {
            query.query_types = types;
        }
        if let Some(status) = &changes.status {
            query.status = status.clone();
        }
        Ok(query.clone())
    }

    async fn set_query_status(&self, id: DbId, status: &str) -> Result<Query, ClientError> {
        let mut state = self.enter("set_query_status")?;
        validate_query_status(status).map_err(invalid)?;
        let query = state.query_mut(id)?;
        query.status = status.to_string();
        Ok(query.clone())
    }

    async fn add_query_type(&self, id: DbId, query_type: &str) -> Result<Query, ClientError> {
        let mut state = self.enter("add_query_type")?;
        let query = state.query_mut(id)?;
        query.query_types = add_query_type(&query.query_types, query_type).map_err(invalid)?;
        Ok(query.clone())
    }

    async fn remove_query_type(&self, id: DbId, query_type: &str) -> Result<Query, ClientError> {
        let mut state = self.enter("remove_query_type")?;
        let query = state.query_mut(id)?;
        query.query_types = remove_query_type(&query.query_types, query_type).map_err(invalid)?;
        Ok(query.clone())
    }

    async fn delete_query(&self, id: DbId) -> Result<(), ClientError> {
        let mut state = self.enter("delete_query")?;
        state.query_mut(id)?;
        state.remove_query_graph(id);
        Ok(())
    }

    async fn create_annotation(
        &self,
        query_id: DbId,
        annotation: &AnnotationSubmission,
    ) -> Result<Annotation, ClientError> {
        let mut state = self.enter("create_annotation")?;
        state.query_mut(query_id)?;
        let input = validate_annotation(annotation).map_err(invalid)?;
        let now = Utc::now();
        let created = Annotation {
            id: state.id(),
            query_id,
            start_timestamp: input.start_timestamp,
            end_timestamp: input.end_timestamp,
            notes: input.notes,
            is_annotated: input.is_annotated,
            created_at: now,
            updated_at: now,
        };
        state.annotations.push(created.clone());
        Ok(created)
    }

    async fn list_annotations(&self, query_id: DbId) -> Result<Vec<Annotation>, ClientError> {
        let mut state = self.enter("list_annotations")?;
        state.query_mut(query_id)?;
        Ok(state
            .annotations
            .iter()
            .filter(|a| a.query_id == query_id)
            .cloned()
            .collect())
    }

    async fn update_annotation(
        &self,
        id: DbId,
        changes: &AnnotationUpdate,
    ) -> Result<Annotation, ClientError> {
        let mut state = self.enter("update_annotation")?;
        if let Some(start) = &changes.start_timestamp {
            validate_timestamp("start_timestamp", start).map_err(invalid)?;
        }
        if let Some(end) = &changes.end_timestamp {
            validate_timestamp("end_timestamp", end).map_err(invalid)?;
        }
        let annotation = state.annotation_mut(id)?;
        if let Some(start) = &changes.start_timestamp {
            annotation.start_timestamp = start.clone();
        }
        if let Some(end) = &changes.end_timestamp {
            annotation.end_timestamp = end.clone();
        }
        if let Some(notes) = &changes.notes {
            annotation.notes = Some(notes.clone());
        }
        Ok(annotation.clone())
    }

    async fn set_annotated(
        &self,
        id: DbId,
        is_annotated: &str,
    ) -> Result<Annotation, ClientError> {
        let mut state = self.enter("set_annotated")?;
        validate_annotation_flag(is_annotated).map_err(invalid)?;
        let annotation = state.annotation_mut(id)?;
        annotation.is_annotated = is_annotated.to_string();
        Ok(annotation.clone())
    }

    async fn delete_annotation(&self, id: DbId) -> Result<(), ClientError> {
        let mut state = self.enter("delete_annotation")?;
        state.annotation_mut(id)?;
        state.annotations.retain(|a| a.id != id);
        Ok(())
    }

    async fn export(&self, annotator: Option<&str>) -> Result<ExportDocument, ClientError> {
        let state = self.enter("export")?;
        Ok(state
            .videos
            .iter()
            .filter(|v| annotator.is_none() || v.annotator.as_deref() == annotator)
            .map(|video| {
                let queries = state
                    .queries
                    .iter()
                    .filter(|q| q.video_id == video.id)
                    .map(|query| {
                        let annotations = state
                            .annotations
                            .iter()
                            .filter(|a| a.query_id == query.id)
                            .map(Annotation::to_export)
                            .collect();
                        query.to_export(annotations)
                    })
                    .collect();
                video.to_export(queries)
            })
            .collect())
    }
}
