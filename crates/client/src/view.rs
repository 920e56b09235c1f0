//! View-model state machine for the annotation client.
//!
//! The screen is always one [`View`]. Tabs (`Submit`, `Import`, `History`)
//! are navigation roots; `Queries` and `Annotations` are pushed on top and
//! carry the video (and query) they belong to, so a query list can never
//! be shown without its video.
//!
//! Lists are only ever replaced wholesale by a fetch. Every successful
//! mutation re-fetches the lists it affects; a failed one sets an error
//! banner and leaves all lists untouched. Fetches are tagged with a
//! [`FetchTicket`]: a response is applied only if its list is still on
//! screen and no newer fetch for that list has been issued.

use std::path::{Path, PathBuf};

use annotator_core::submission::{
    validate_annotation, validate_query, validate_video, AnnotationSubmission, QuerySubmission,
    VideoSubmission,
};
use annotator_core::timeline::{layout, Timeline, TimelineSpan};
use annotator_core::timestamp::DEFAULT_TIMESTAMP;
use annotator_core::types::DbId;
use annotator_core::workflow::{add_query_type, default_query_types, remove_query_type};

use crate::api::AnnotationApi;
use crate::error::ClientError;
use crate::export::{export_document, save_export};
use crate::import::load_import_file;
use crate::models::{
    Annotation, AnnotationUpdate, Query, QueryUpdate, SubmissionResult, Video, VideoUpdate,
};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Submit,
    Import,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Submit,
    Import,
    History,
    Queries { video: Video },
    Annotations { video: Video, query: Query },
}

impl From<Tab> for View {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Submit => View::Submit,
            Tab::Import => View::Import,
            Tab::History => View::History,
        }
    }
}

impl View {
    /// Heading shown for this view.
    pub fn title(&self) -> String {
        match self {
            View::Submit => "Submit Video".to_string(),
            View::Import => "Import".to_string(),
            View::History => "History".to_string(),
            View::Queries { video } => format!("Queries: {}", video.title),
            View::Annotations { query, .. } => format!("Annotations: {}", query.query_text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// A list the view model can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListTarget {
    Videos { annotator: Option<String> },
    Queries { video_id: DbId },
    Annotations { query_id: DbId },
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    target: ListTarget,
    seq: u64,
}

impl FetchTicket {
    pub fn target(&self) -> &ListTarget {
        &self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListData {
    Videos(Vec<Video>),
    Queries(Vec<Query>),
    Annotations(Vec<Annotation>),
}

/// Load one list. Free of view-model state so callers can run it while
/// the view model keeps handling input.
pub async fn fetch_list<A: AnnotationApi + ?Sized>(
    api: &A,
    target: &ListTarget,
) -> Result<ListData, ClientError> {
    match target {
        ListTarget::Videos { annotator } => {
            api.list_videos(annotator.as_deref()).await.map(ListData::Videos)
        }
        ListTarget::Queries { video_id } => api.list_queries(*video_id).await.map(ListData::Queries),
        ListTarget::Annotations { query_id } => api
            .list_annotations(*query_id)
            .await
            .map(ListData::Annotations),
    }
}

#[derive(Debug, Default)]
struct LatestFetches {
    videos: u64,
    queries: u64,
    annotations: u64,
}

impl LatestFetches {
    fn get(&self, target: &ListTarget) -> u64 {
        match target {
            ListTarget::Videos { .. } => self.videos,
            ListTarget::Queries { .. } => self.queries,
            ListTarget::Annotations { .. } => self.annotations,
        }
    }

    fn slot(&mut self, target: &ListTarget) -> &mut u64 {
        match target {
            ListTarget::Videos { .. } => &mut self.videos,
            ListTarget::Queries { .. } => &mut self.queries,
            ListTarget::Annotations { .. } => &mut self.annotations,
        }
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Fields of the "submit a video" form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitForm {
    pub url: String,
    pub title: String,
    pub annotator: String,
    pub description: String,
    pub topic: String,
    pub duration: String,
    pub notes: String,
}

impl SubmitForm {
    pub fn to_submission(&self) -> Result<VideoSubmission, String> {
        let duration = match self.duration.trim() {
            "" => None,
            raw => Some(
                raw.parse::<i32>()
                    .map_err(|_| format!("duration must be a whole number of seconds, got '{raw}'"))?,
            ),
        };
        let submission = VideoSubmission {
            url: non_empty(&self.url),
            title: non_empty(&self.title),
            annotator: non_empty(&self.annotator),
            description: non_empty(&self.description),
            topic: non_empty(&self.topic),
            duration,
            notes: non_empty(&self.notes),
            status: None,
            queries: Vec::new(),
        };
        validate_video(&submission)?;
        Ok(submission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryForm {
    pub query_text: String,
    pub query_types: Vec<String>,
}

impl Default for QueryForm {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            query_types: default_query_types(),
        }
    }
}

impl QueryForm {
    /// Add the type if absent, remove it if present. The last type cannot
    /// be removed.
    pub fn toggle_type(&mut self, query_type: &str) -> Result<(), String> {
        self.query_types = if self.query_types.iter().any(|t| t == query_type) {
            remove_query_type(&self.query_types, query_type)?
        } else {
            add_query_type(&self.query_types, query_type)?
        };
        Ok(())
    }

    pub fn to_submission(&self) -> Result<QuerySubmission, String> {
        let submission = QuerySubmission {
            query_text: non_empty(&self.query_text),
            query_types: Some(self.query_types.clone()),
            status: None,
            annotations: Vec::new(),
        };
        validate_query(&submission)?;
        Ok(submission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationForm {
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub notes: String,
}

impl Default for AnnotationForm {
    fn default() -> Self {
        Self {
            start_timestamp: DEFAULT_TIMESTAMP.to_string(),
            end_timestamp: DEFAULT_TIMESTAMP.to_string(),
            notes: String::new(),
        }
    }
}

impl AnnotationForm {
    pub fn to_submission(&self) -> Result<AnnotationSubmission, String> {
        let submission = AnnotationSubmission {
            start_timestamp: Some(self.start_timestamp.trim().to_string()),
            end_timestamp: Some(self.end_timestamp.trim().to_string()),
            notes: non_empty(&self.notes),
            is_annotated: None,
        };
        validate_annotation(&submission)?;
        Ok(submission)
    }
}

/// Pending in-place edit of one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EditBuffer {
    Video { id: DbId, changes: VideoUpdate },
    Query { id: DbId, changes: QueryUpdate },
    Annotation { id: DbId, changes: AnnotationUpdate },
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

pub struct ViewModel<A: AnnotationApi> {
    api: A,
    /// Never empty; the first entry is a tab root.
    stack: Vec<View>,
    videos: Vec<Video>,
    queries: Vec<Query>,
    annotations: Vec<Annotation>,
    annotator_filter: Option<String>,
    banner: Option<Banner>,
    edit: Option<EditBuffer>,
    seq: u64,
    latest: LatestFetches,
    pub submit_form: SubmitForm,
    pub query_form: QueryForm,
    pub annotation_form: AnnotationForm,
}

impl<A: AnnotationApi> ViewModel<A> {
    /// Start on the Submit tab with empty lists.
    pub fn new(api: A) -> Self {
        Self {
            api,
            stack: vec![View::Submit],
            videos: Vec::new(),
            queries: Vec::new(),
            annotations: Vec::new(),
            annotator_filter: None,
            banner: None,
            edit: None,
            seq: 0,
            latest: LatestFetches::default(),
            submit_form: SubmitForm::default(),
            query_form: QueryForm::default(),
            annotation_form: AnnotationForm::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> &View {
        // The stack always holds its tab root.
        &self.stack[self.stack.len() - 1]
    }

    /// Number of views on the navigation stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    pub fn annotator_filter(&self) -> Option<&str> {
        self.annotator_filter.as_deref()
    }

    pub fn edit(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditBuffer> {
        self.edit.as_mut()
    }

    /// The video whose queries (or annotations) are on the stack.
    pub fn selected_video(&self) -> Option<&Video> {
        self.stack.iter().rev().find_map(|view| match view {
            View::Queries { video } | View::Annotations { video, .. } => Some(video),
            _ => None,
        })
    }

    pub fn selected_query(&self) -> Option<&Query> {
        self.stack.iter().rev().find_map(|view| match view {
            View::Annotations { query, .. } => Some(query),
            _ => None,
        })
    }

    /// Annotation timeline for the Annotations view.
    pub fn timeline(&self) -> Option<Timeline> {
        let View::Annotations { video, .. } = self.view() else {
            return None;
        };
        let spans: Vec<TimelineSpan<'_>> = self
            .annotations
            .iter()
            .map(|a| TimelineSpan {
                id: a.id,
                start_timestamp: &a.start_timestamp,
                end_timestamp: &a.end_timestamp,
            })
            .collect();
        layout(&spans, video.duration)
    }

    // ---- navigation ----

    /// Switch tabs. Resets the navigation stack to the tab root.
    pub async fn select_tab(&mut self, tab: Tab) {
        self.stack = vec![tab.into()];
        self.edit = None;
        self.reload().await;
    }

    /// Change the History annotator filter; blank clears it.
    pub async fn set_annotator_filter(&mut self, annotator: Option<&str>) {
        self.annotator_filter = annotator.and_then(non_empty);
        if matches!(self.view(), View::History) {
            self.reload().await;
        }
    }

    /// Show `video`'s queries on top of History.
    pub async fn open_queries(&mut self, video: Video) {
        self.stack = vec![View::History, View::Queries { video }];
        self.edit = None;
        self.queries.clear();
        self.annotations.clear();
        self.reload().await;
    }

    /// Show `query`'s annotations. Only valid from the query's own list.
    pub async fn open_annotations(&mut self, query: Query) {
        let video = match self.view() {
            View::Queries { video } if video.id == query.video_id => Some(video.clone()),
            _ => None,
        };
        let Some(video) = video else {
            self.banner = Some(Banner::Error(
                "Select the query's video before opening its annotations".to_string(),
            ));
            return;
        };
        self.stack.push(View::Annotations { video, query });
        self.edit = None;
        self.annotations.clear();
        self.reload().await;
    }

    /// Return to the parent view without re-fetching its list.
    pub fn back(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
            self.edit = None;
        }
    }

    /// Re-fetch the list of the current view.
    pub async fn refresh(&mut self) {
        self.reload().await;
    }

    // ---- fetch bookkeeping ----

    fn current_target(&self) -> Option<ListTarget> {
        match self.view() {
            View::History => Some(ListTarget::Videos {
                annotator: self.annotator_filter.clone(),
            }),
            View::Queries { video } => Some(ListTarget::Queries { video_id: video.id }),
            View::Annotations { query, .. } => Some(ListTarget::Annotations { query_id: query.id }),
            View::Submit | View::Import => None,
        }
    }

    fn issue(&mut self, target: ListTarget) -> FetchTicket {
        self.seq += 1;
        *self.latest.slot(&target) = self.seq;
        FetchTicket {
            target,
            seq: self.seq,
        }
    }

    /// Issue a fetch for the current view's list, if it has one.
    pub fn ticket(&mut self) -> Option<FetchTicket> {
        let target = self.current_target()?;
        Some(self.issue(target))
    }

    /// Whether a response for `ticket` may still be applied.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        if self.latest.get(&ticket.target) != ticket.seq {
            return false;
        }
        match &ticket.target {
            ListTarget::Videos { annotator } => *annotator == self.annotator_filter,
            ListTarget::Queries { video_id } => self.selected_video().map(|v| v.id) == Some(*video_id),
            ListTarget::Annotations { query_id } => {
                self.selected_query().map(|q| q.id) == Some(*query_id)
            }
        }
    }

    /// Apply a fetch result. Returns `false` if the response was stale and
    /// discarded.
    pub fn apply(&mut self, ticket: FetchTicket, result: Result<ListData, ClientError>) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(target = ?ticket.target, "Discarding stale list response");
            return false;
        }
        match result {
            Ok(ListData::Videos(videos)) => self.videos = videos,
            Ok(ListData::Queries(queries)) => self.queries = queries,
            Ok(ListData::Annotations(annotations)) => self.annotations = annotations,
            Err(e) => self.fail(e),
        }
        true
    }

    async fn reload(&mut self) {
        if let Some(ticket) = self.ticket() {
            let result = fetch_list(&self.api, ticket.target()).await;
            self.apply(ticket, result);
        }
    }

    async fn refetch(&mut self, target: ListTarget) {
        let ticket = self.issue(target);
        let result = fetch_list(&self.api, ticket.target()).await;
        self.apply(ticket, result);
    }

    fn videos_target(&self) -> ListTarget {
        ListTarget::Videos {
            annotator: self.annotator_filter.clone(),
        }
    }

    fn fail(&mut self, error: ClientError) {
        tracing::warn!(error = %error, "Client request failed");
        self.banner = Some(Banner::Error(error.user_message()));
    }

    /// Report a mutation result; on success set `message` and re-fetch
    /// `targets` in order.
    async fn finish<T>(
        &mut self,
        result: Result<T, ClientError>,
        message: impl FnOnce(&T) -> String,
        targets: Vec<ListTarget>,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                self.banner = Some(Banner::Success(message(&value)));
                for target in targets {
                    self.refetch(target).await;
                }
                Some(value)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    // ---- submission, import, export ----

    /// Submit the video in [`SubmitForm`]. The form is cleared on success.
    pub async fn submit(&mut self) -> Option<SubmissionResult> {
        let submission = match self.submit_form.to_submission() {
            Ok(submission) => submission,
            Err(msg) => {
                self.fail(ClientError::Invalid(msg));
                return None;
            }
        };
        let result = self.api.submit_video(&submission).await;
        let targets = vec![self.videos_target()];
        let created = self
            .finish(
                result,
                |r| match r.videos.first() {
                    Some(video) => format!("Video submitted: {}", video.title),
                    None => "Video submitted".to_string(),
                },
                targets,
            )
            .await?;
        self.submit_form = SubmitForm::default();
        Some(created)
    }

    /// Load a JSON document from `path` and submit it in one request.
    pub async fn import_file(&mut self, path: &Path) -> Option<SubmissionResult> {
        let videos = match load_import_file(path).await {
            Ok(videos) => videos,
            Err(e) => {
                self.fail(e);
                return None;
            }
        };
        let result = self.api.submit_bulk(&videos).await;
        let targets = vec![self.videos_target()];
        self.finish(
            result,
            |r| {
                format!(
                    "Imported {} videos, {} queries, {} annotations",
                    r.videos_created, r.queries_created, r.annotations_created
                )
            },
            targets,
        )
        .await
    }

    /// Export the current annotator's (or everyone's) work into `dir`.
    pub async fn export_to(&mut self, dir: &Path) -> Option<PathBuf> {
        let annotator = self.annotator_filter.clone();
        let saved = match export_document(&self.api, annotator.as_deref()).await {
            Ok(document) => save_export(dir, annotator.as_deref(), &document)
                .await
                .map(|path| (path, document.len())),
            Err(e) => Err(e),
        };
        match saved {
            Ok((path, videos)) => {
                self.banner = Some(Banner::Success(format!(
                    "Exported {videos} videos to {}",
                    path.display()
                )));
                Some(path)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    // ---- videos ----

    pub async fn set_video_status(&mut self, id: DbId, status: &str) -> Option<Video> {
        let result = self.api.set_video_status(id, status).await;
        let targets = vec![self.videos_target()];
        self.finish(result, |v| format!("Video marked {}", v.status), targets)
            .await
    }

    pub async fn delete_video(&mut self, id: DbId) -> bool {
        let result = self.api.delete_video(id).await;
        if result.is_ok() && self.selected_video().is_some_and(|v| v.id == id) {
            self.stack = vec![View::History];
        }
        let targets = vec![self.videos_target()];
        self.finish(result, |_| "Video deleted".to_string(), targets)
            .await
            .is_some()
    }

    // ---- queries ----

    /// Create the query in [`QueryForm`] under the selected video.
    pub async fn create_query(&mut self) -> Option<Query> {
        let Some(video_id) = self.selected_video().map(|v| v.id) else {
            self.fail(ClientError::Invalid("Select a video first".to_string()));
            return None;
        };
        let submission = match self.query_form.to_submission() {
            Ok(submission) => submission,
            Err(msg) => {
                self.fail(ClientError::Invalid(msg));
                return None;
            }
        };
        let result = self.api.create_query(video_id, &submission).await;
        let targets = vec![ListTarget::Queries { video_id }, self.videos_target()];
        let created = self
            .finish(result, |_| "Query added".to_string(), targets)
            .await?;
        self.query_form = QueryForm::default();
        Some(created)
    }

    fn queries_targets(&self) -> Vec<ListTarget> {
        self.selected_video()
            .map(|v| ListTarget::Queries { video_id: v.id })
            .into_iter()
            .collect()
    }

    pub async fn set_query_status(&mut self, id: DbId, status: &str) -> Option<Query> {
        let result = self.api.set_query_status(id, status).await;
        let targets = self.queries_targets();
        self.finish(result, |q| format!("Query marked {}", q.status), targets)
            .await
    }

    pub async fn add_query_type(&mut self, id: DbId, query_type: &str) -> Option<Query> {
        let result = self.api.add_query_type(id, query_type).await;
        let targets = self.queries_targets();
        self.finish(result, |_| format!("Added type '{query_type}'"), targets)
            .await
    }

    pub async fn remove_query_type(&mut self, id: DbId, query_type: &str) -> Option<Query> {
        let result = self.api.remove_query_type(id, query_type).await;
        let targets = self.queries_targets();
        self.finish(result, |_| format!("Removed type '{query_type}'"), targets)
            .await
    }

    pub async fn delete_query(&mut self, id: DbId) -> bool {
        let result = self.api.delete_query(id).await;
        if result.is_ok() && self.selected_query().is_some_and(|q| q.id == id) {
            self.stack.pop();
        }
        let mut targets = self.queries_targets();
        targets.push(self.videos_target());
        self.finish(result, |_| "Query deleted".to_string(), targets)
            .await
            .is_some()
    }

    // ---- annotations ----

    /// Create the annotation in [`AnnotationForm`] under the selected query.
    pub async fn create_annotation(&mut self) -> Option<Annotation> {
        let Some(query_id) = self.selected_query().map(|q| q.id) else {
            self.fail(ClientError::Invalid("Select a query first".to_string()));
            return None;
        };
        let submission = match self.annotation_form.to_submission() {
            Ok(submission) => submission,
            Err(msg) => {
                self.fail(ClientError::Invalid(msg));
                return None;
            }
        };
        let result = self.api.create_annotation(query_id, &submission).await;
        let mut targets = vec![ListTarget::Annotations { query_id }];
        targets.extend(self.queries_targets());
        let created = self
            .finish(result, |_| "Annotation added".to_string(), targets)
            .await?;
        self.annotation_form = AnnotationForm::default();
        Some(created)
    }

    fn annotations_targets(&self) -> Vec<ListTarget> {
        self.selected_query()
            .map(|q| ListTarget::Annotations { query_id: q.id })
            .into_iter()
            .collect()
    }

    pub async fn set_annotated(&mut self, id: DbId, is_annotated: &str) -> Option<Annotation> {
        let result = self.api.set_annotated(id, is_annotated).await;
        let targets = self.annotations_targets();
        self.finish(
            result,
            |a| format!("Annotation marked {}", a.is_annotated),
            targets,
        )
        .await
    }

    pub async fn delete_annotation(&mut self, id: DbId) -> bool {
        let result = self.api.delete_annotation(id).await;
        let mut targets = self.annotations_targets();
        targets.extend(self.queries_targets());
        self.finish(result, |_| "Annotation deleted".to_string(), targets)
            .await
            .is_some()
    }

    // ---- in-place edits ----

    pub fn begin_edit_video(&mut self, video: &Video) {
        self.edit = Some(EditBuffer::Video {
            id: video.id,
            changes: VideoUpdate::default(),
        });
    }

    pub fn begin_edit_query(&mut self, query: &Query) {
        self.edit = Some(EditBuffer::Query {
            id: query.id,
            changes: QueryUpdate::default(),
        });
    }

    pub fn begin_edit_annotation(&mut self, annotation: &Annotation) {
        self.edit = Some(EditBuffer::Annotation {
            id: annotation.id,
            changes: AnnotationUpdate::default(),
        });
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Send the pending edit. The buffer is kept if the request fails.
    pub async fn save_edit(&mut self) -> bool {
        let Some(edit) = self.edit.clone() else {
            return false;
        };
        let saved = match &edit {
            EditBuffer::Video { id, changes } => {
                let result = self.api.update_video(*id, changes).await;
                let targets = vec![self.videos_target()];
                self.finish(result, |_| "Video updated".to_string(), targets)
                    .await
                    .is_some()
            }
            EditBuffer::Query { id, changes } => {
                let result = self.api.update_query(*id, changes).await;
                let targets = self.queries_targets();
                self.finish(result, |_| "Query updated".to_string(), targets)
                    .await
                    .is_some()
            }
            EditBuffer::Annotation { id, changes } => {
                let result = self.api.update_annotation(*id, changes).await;
                let targets = self.annotations_targets();
                self.finish(result, |_| "Annotation updated".to_string(), targets)
                    .await
                    .is_some()
            }
        };
        if saved {
            self.edit = None;
        }
        saved
    }
}
