//! Video submission payloads and their validation.
//!
//! A submission is one video object (or an array of them) with optional
//! nested queries and annotations. Validation turns the loosely-typed
//! wire payload into a [`NewVideoGraph`] with every default applied, so
//! the persistence layer never sees an unchecked value.
//!
//! The export document ([`crate::export`]) serializes into exactly this
//! shape, which is what makes export → re-import a round trip.

use serde::{Deserialize, Serialize};

use crate::timestamp::{validate_timestamp, DEFAULT_TIMESTAMP};
use crate::workflow::{
    default_query_types, normalize_query_types, validate_annotation_flag, validate_duration,
    validate_query_status, validate_required_text, validate_video_status, ANNOTATION_UNANNOTATED,
    QUERY_STATUS_UNVERIFIED, VIDEO_STATUS_PENDING,
};

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// Annotation as it appears inside a submission or export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSubmission {
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    pub notes: Option<String>,
    pub is_annotated: Option<String>,
}

/// Query as it appears inside a submission or export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySubmission {
    pub query_text: Option<String>,
    pub query_types: Option<Vec<String>>,
    pub status: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationSubmission>,
}

/// Video as it appears in a submission or export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoSubmission {
    pub url: Option<String>,
    pub title: Option<String>,
    pub annotator: Option<String>,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub duration: Option<i32>,
    pub notes: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub queries: Vec<QuerySubmission>,
}

/// Request body of the submission endpoint: a single video or an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubmissionPayload {
    Many(Vec<VideoSubmission>),
    One(Box<VideoSubmission>),
}

impl SubmissionPayload {
    pub fn into_videos(self) -> Vec<VideoSubmission> {
        match self {
            SubmissionPayload::Many(videos) => videos,
            SubmissionPayload::One(video) => vec![*video],
        }
    }
}

// ---------------------------------------------------------------------------
// Validated graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnotation {
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub notes: Option<String>,
    pub is_annotated: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewQuery {
    pub query_text: String,
    pub query_types: Vec<String>,
    pub status: String,
    pub annotations: Vec<NewAnnotation>,
}

/// A fully validated video with its nested children, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideoGraph {
    pub url: String,
    pub title: String,
    pub annotator: Option<String>,
    pub description: Option<String>,
    pub topic: Option<String>,
    /// `None` until the duration probe fills it in (or gives up).
    pub duration: Option<i32>,
    pub notes: Option<String>,
    pub status: String,
    pub queries: Vec<NewQuery>,
}

impl NewVideoGraph {
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.queries.iter().map(|q| q.annotations.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn require(field: &str, value: &Option<String>) -> Result<String, String> {
    match value {
        Some(v) => {
            validate_required_text(field, v)?;
            Ok(v.clone())
        }
        None => Err(format!("{field} is required")),
    }
}

fn prefixed<T>(prefix: &str, result: Result<T, String>) -> Result<T, String> {
    result.map_err(|e| format!("{prefix}: {e}"))
}

pub fn validate_annotation(input: &AnnotationSubmission) -> Result<NewAnnotation, String> {
    let start = input
        .start_timestamp
        .clone()
        .unwrap_or_else(|| DEFAULT_TIMESTAMP.to_string());
    let end = input
        .end_timestamp
        .clone()
        .unwrap_or_else(|| DEFAULT_TIMESTAMP.to_string());
    validate_timestamp("start_timestamp", &start)?;
    validate_timestamp("end_timestamp", &end)?;

    let is_annotated = match &input.is_annotated {
        Some(flag) => {
            validate_annotation_flag(flag)?;
            flag.clone()
        }
        None => ANNOTATION_UNANNOTATED.to_string(),
    };

    Ok(NewAnnotation {
        start_timestamp: start,
        end_timestamp: end,
        notes: input.notes.clone(),
        is_annotated,
    })
}

pub fn validate_query(input: &QuerySubmission) -> Result<NewQuery, String> {
    let query_text = require("query_text", &input.query_text)?;

    let query_types = match &input.query_types {
        Some(types) => normalize_query_types(types)?,
        None => default_query_types(),
    };

    let status = match &input.status {
        Some(status) => {
            validate_query_status(status)?;
            status.clone()
        }
        None => QUERY_STATUS_UNVERIFIED.to_string(),
    };

    let annotations = input
        .annotations
        .iter()
        .enumerate()
        .map(|(i, a)| prefixed(&format!("annotations[{i}]"), validate_annotation(a)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewQuery {
        query_text,
        query_types,
        status,
        annotations,
    })
}

/// Validate one submitted video and everything nested under it.
pub fn validate_video(input: &VideoSubmission) -> Result<NewVideoGraph, String> {
    let url = require("url", &input.url)?;
    let title = require("title", &input.title)?;

    if let Some(duration) = input.duration {
        validate_duration(duration)?;
    }

    let status = match &input.status {
        Some(status) => {
            validate_video_status(status)?;
            status.clone()
        }
        None => VIDEO_STATUS_PENDING.to_string(),
    };

    let queries = input
        .queries
        .iter()
        .enumerate()
        .map(|(i, q)| prefixed(&format!("queries[{i}]"), validate_query(q)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewVideoGraph {
        url,
        title,
        annotator: input.annotator.clone(),
        description: input.description.clone(),
        topic: input.topic.clone(),
        duration: input.duration,
        notes: input.notes.clone(),
        status,
        queries,
    })
}

/// Validate a whole batch. The first invalid video rejects the batch; the
/// error names its index.
pub fn validate_batch(videos: &[VideoSubmission]) -> Result<Vec<NewVideoGraph>, String> {
    if videos.is_empty() {
        return Err("Submission must contain at least one video".to_string());
    }
    videos
        .iter()
        .enumerate()
        .map(|(i, v)| prefixed(&format!("videos[{i}]"), validate_video(v)))
        .collect()
}
