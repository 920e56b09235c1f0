//! Read-only aggregation of the nested export document.

use std::collections::HashMap;

use annotator_core::export::{ExportDocument, ExportQuery};
use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::annotation::Annotation;
use crate::models::query::Query;
use crate::models::video::Video;
use crate::repositories::video_repo;

/// Builds export documents.
pub struct ExportRepo;

impl ExportRepo {
    /// Assemble videos (optionally only one annotator's), their queries and
    /// annotations into one nested document.
    ///
    /// All three reads run in one `REPEATABLE READ` read-only transaction so
    /// the document is a consistent snapshot. Every level is ordered by
    /// insertion.
    pub async fn export(
        pool: &PgPool,
        annotator: Option<&str>,
    ) -> Result<ExportDocument, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let video_query = format!(
            "SELECT {} FROM videos
             WHERE ($1::TEXT IS NULL OR annotator = $1)
             ORDER BY created_at ASC, id ASC",
            video_repo::COLUMNS
        );
        let videos = sqlx::query_as::<_, Video>(&video_query)
            .bind(annotator)
            .fetch_all(&mut *tx)
            .await?;

        let video_ids: Vec<DbId> = videos.iter().map(|v| v.id).collect();

        let queries = sqlx::query_as::<_, Query>(
            "SELECT id, video_id, query_text, status, query_types, created_at, updated_at
             FROM queries
             WHERE video_id = ANY($1)
             ORDER BY created_at ASC, id ASC",
        )
        .bind(&video_ids)
        .fetch_all(&mut *tx)
        .await?;

        let query_ids: Vec<DbId> = queries.iter().map(|q| q.id).collect();

        let annotations = sqlx::query_as::<_, Annotation>(
            "SELECT id, query_id, start_timestamp, end_timestamp, notes, is_annotated,
                    created_at, updated_at
             FROM annotations
             WHERE query_id = ANY($1)
             ORDER BY created_at ASC, id ASC",
        )
        .bind(&query_ids)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(assemble(&videos, &queries, &annotations))
    }
}

/// Nest flat, insertion-ordered rows into the export shape.
fn assemble(videos: &[Video], queries: &[Query], annotations: &[Annotation]) -> ExportDocument {
    let mut annotations_by_query: HashMap<DbId, Vec<&Annotation>> = HashMap::new();
    for annotation in annotations {
        annotations_by_query
            .entry(annotation.query_id)
            .or_default()
            .push(annotation);
    }

    let mut queries_by_video: HashMap<DbId, Vec<ExportQuery>> = HashMap::new();
    for query in queries {
        let nested = annotations_by_query
            .remove(&query.id)
            .unwrap_or_default()
            .into_iter()
            .map(Annotation::to_export)
            .collect();
        queries_by_video
            .entry(query.video_id)
            .or_default()
            .push(query.to_export(nested));
    }

    videos
        .iter()
        .map(|video| video.to_export(queries_by_video.remove(&video.id).unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn video(id: DbId) -> Video {
        Video {
            id,
            url: format!("https://x/{id}.mp4"),
            title: format!("Video {id}"),
            annotator: None,
            description: None,
            topic: None,
            duration: Some(60),
            notes: None,
            status: "pending".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn query(id: DbId, video_id: DbId) -> Query {
        Query {
            id,
            video_id,
            query_text: format!("Query {id}"),
            status: "unverified".into(),
            query_types: vec!["static".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn annotation(id: DbId, query_id: DbId, start: &str) -> Annotation {
        Annotation {
            id,
            query_id,
            start_timestamp: start.into(),
            end_timestamp: "00:00:30".into(),
            notes: Some(format!("note {id}")),
            is_annotated: "unannotated".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn nests_rows_preserving_order() {
        let videos = [video(1), video(2)];
        let queries = [query(10, 1), query(11, 2), query(12, 1)];
        let annotations = [
            annotation(100, 12, "00:00:01"),
            annotation(101, 10, "00:00:02"),
            annotation(102, 12, "00:00:03"),
        ];

        let doc = assemble(&videos, &queries, &annotations);

        assert_eq!(doc.len(), 2);
        let first = &doc[0];
        assert_eq!(first.title.as_deref(), Some("Video 1"));
        assert_eq!(first.queries.len(), 2);
        assert_eq!(first.queries[0].query_text.as_deref(), Some("Query 10"));
        assert_eq!(first.queries[1].annotations.len(), 2);
        assert_eq!(
            first.queries[1].annotations[1].start_timestamp.as_deref(),
            Some("00:00:03")
        );
        assert!(doc[1].queries[0].annotations.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_document() {
        assert!(assemble(&[], &[], &[]).is_empty());
    }
}
