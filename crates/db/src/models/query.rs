//! Query entity model and DTOs.

use annotator_core::export::{ExportAnnotation, ExportQuery};
use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `queries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Query {
    pub id: DbId,
    pub video_id: DbId,
    pub query_text: String,
    pub status: String,
    pub query_types: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
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

/// A query row with the number of annotations it owns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueryWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub query: Query,
    pub annotation_count: i64,
}

/// DTO for updating a query. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuery {
    pub query_text: Option<String>,
    pub query_types: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Body of `POST /queries/{id}/types`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryTypeInput {
    pub query_type: String,
}
