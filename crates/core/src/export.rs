//! The nested export document.
//!
//! An export is a list of videos, each carrying its queries and their
//! annotations, without identifiers or creation timestamps. It reuses the
//! submission payload types so any export can be submitted back.

use chrono::NaiveDate;
use serde::Serialize;

use crate::submission::{AnnotationSubmission, QuerySubmission, VideoSubmission};

pub type ExportAnnotation = AnnotationSubmission;
pub type ExportQuery = QuerySubmission;
pub type ExportVideo = VideoSubmission;

/// A complete export: every selected video with its nested children.
pub type ExportDocument = Vec<ExportVideo>;

/// Entity counts for an export document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    pub videos: usize,
    pub queries: usize,
    pub annotations: usize,
}

pub fn stats(document: &[ExportVideo]) -> ExportStats {
    let queries = document.iter().map(|v| v.queries.len()).sum();
    let annotations = document
        .iter()
        .flat_map(|v| v.queries.iter())
        .map(|q| q.annotations.len())
        .sum();
    ExportStats {
        videos: document.len(),
        queries,
        annotations,
    }
}

/// Suggested file name for saving an export, e.g.
/// `annotations_jane_doe_2026-01-31.json`.
pub fn export_file_name(annotator: Option<&str>, date: NaiveDate) -> String {
    match annotator.map(str::trim).filter(|a| !a.is_empty()) {
        Some(name) => {
            let slug: String = name
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() {
                        c.to_ascii_lowercase()
                    } else {
                        '_'
                    }
                })
                .collect();
            format!("annotations_{slug}_{date}.json")
        }
        None => format!("annotations_all_{date}.json"),
    }
}
