//! Representations returned by the API, and the bodies the client sends.

use annotator_core::export::{ExportAnnotation, ExportQuery, ExportVideo};
use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored video. `query_count` is present on list and detail reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: DbId,
    pub url: String,
    pub title: String,
    pub annotator: Option<String>,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub duration: Option<i32>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub query_count: Option<i64>,
}

impl Video {
    pub fn to_export(&self, queries: Vec<ExportQuery>) -> ExportVideo {
        ExportVideo {
            url: Some(self.url.clone()),
            title: Some(self.title.clone()),
            annotator: self.annotator.clone(),
            description: self.description.clone(),
            topic: self.topic.clone(),
            duration: self.duration,
            notes: self.notes.clone(),
            status: Some(self.status.clone()),
            queries,
        }
    }
}

/// A stored query. `annotation_count` is present on list reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub id: DbId,
    pub video_id: DbId,
    pub query_text: String,
    pub status: String,
    pub query_types: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub annotation_count: Option<i64>,
}

impl Query {
    pub fn to_export(&self, annotations: Vec<ExportAnnotation>) -> ExportQuery {
        ExportQuery {
            query_text: Some(self.query_text.clone()),
            query_types: Some(self.query_types.clone()),
            status: Some(self.status.clone()),
            annotations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: DbId,
    pub query_id: DbId,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub notes: Option<String>,
    pub is_annotated: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Annotation {
    pub fn to_export(&self) -> ExportAnnotation {
        ExportAnnotation {
            start_timestamp: Some(self.start_timestamp.clone()),
            end_timestamp: Some(self.end_timestamp.clone()),
            notes: self.notes.clone(),
            is_annotated: Some(self.is_annotated.clone()),
        }
    }
}

/// Response of the submission endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub videos_created: usize,
    pub queries_created: usize,
    pub annotations_created: usize,
    pub videos: Vec<Video>,
}

/// Partial video update. `None` fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Partial query update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Partial annotation update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_annotated: Option<String>,
}
