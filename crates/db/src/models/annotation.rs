//! Annotation entity model and DTOs.

use annotator_core::export::ExportAnnotation;
use annotator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `annotations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
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

/// DTO for updating an annotation. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnnotation {
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    pub notes: Option<String>,
    pub is_annotated: Option<String>,
}
