//! Video entity model and DTOs.

use annotator_core::export::{ExportQuery, ExportVideo};
use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
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
}

impl Video {
    /// Export representation of this video with the given queries.
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

/// A video row with the number of queries it owns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub video: Video,
    pub query_count: i64,
}

/// DTO for updating an existing video. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVideo {
    pub url: Option<String>,
    pub title: Option<String>,
    pub annotator: Option<String>,
    pub description: Option<String>,
    pub topic: Option<String>,
    pub duration: Option<i32>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for listing and exporting videos.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoFilter {
    pub annotator: Option<String>,
}

/// Rows removed by a cascading video delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VideoDeleteSummary {
    pub queries_deleted: u64,
    pub annotations_deleted: u64,
}
