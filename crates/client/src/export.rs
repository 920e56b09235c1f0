//! Client-side assembly of the nested export document.
//!
//! Lists videos, then every video's queries, then every query's
//! annotations. Sibling requests run concurrently; the assembled document
//! keeps the order of each list.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;

use annotator_core::export::{export_file_name, stats, ExportDocument, ExportVideo};

use crate::api::AnnotationApi;
use crate::error::ClientError;
use crate::models::Video;

/// Build the export document from the list endpoints.
pub async fn export_document<A: AnnotationApi + ?Sized>(
    api: &A,
    annotator: Option<&str>,
) -> Result<ExportDocument, ClientError> {
    let videos = api.list_videos(annotator).await?;
    let document = try_join_all(videos.iter().map(|video| export_video(api, video))).await?;

    let counts = stats(&document);
    tracing::debug!(
        videos = counts.videos,
        queries = counts.queries,
        annotations = counts.annotations,
        "Export document assembled"
    );
    Ok(document)
}

async fn export_video<A: AnnotationApi + ?Sized>(
    api: &A,
    video: &Video,
) -> Result<ExportVideo, ClientError> {
    let queries = api.list_queries(video.id).await?;
    let nested = try_join_all(queries.iter().map(|query| async move {
        let annotations = api.list_annotations(query.id).await?;
        Ok::<_, ClientError>(query.to_export(annotations.iter().map(|a| a.to_export()).collect()))
    }))
    .await?;
    Ok(video.to_export(nested))
}

/// Write `document` as pretty JSON into `dir`, named after the annotator
/// filter and today's date. Returns the written path.
pub async fn save_export(
    dir: &Path,
    annotator: Option<&str>,
    document: &ExportDocument,
) -> Result<PathBuf, ClientError> {
    let path = dir.join(export_file_name(
        annotator,
        chrono::Local::now().date_naive(),
    ));
    let json = serde_json::to_vec_pretty(document)?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeApi;

    #[tokio::test]
    async fn fan_out_preserves_order_at_every_level() {
        let api = FakeApi::default();
        let first = api.seed_video("https://x/1.mp4", "One", Some("Jane"));
        let second = api.seed_video("https://x/2.mp4", "Two", Some("Omar"));
        let q1 = api.seed_query(first, "first question");
        let q2 = api.seed_query(first, "second question");
        api.seed_annotation(q1, "00:00:01", "00:00:02");
        api.seed_annotation(q1, "00:00:03", "00:00:04");
        api.seed_annotation(q2, "00:00:05", "00:00:06");
        api.seed_query(second, "third question");

        let document = export_document(&api, None).await.unwrap();

        assert_eq!(document.len(), 2);
        assert_eq!(document[0].title.as_deref(), Some("One"));
        assert_eq!(document[0].queries.len(), 2);
        assert_eq!(
            document[0].queries[0].query_text.as_deref(),
            Some("first question")
        );
        let starts: Vec<_> = document[0].queries[0]
            .annotations
            .iter()
            .map(|a| a.start_timestamp.clone().unwrap())
            .collect();
        assert_eq!(starts, vec!["00:00:01", "00:00:03"]);
        assert_eq!(document[1].queries[0].annotations.len(), 0);
    }

    #[tokio::test]
    async fn fan_out_respects_annotator_filter() {
        let api = FakeApi::default();
        api.seed_video("https://x/1.mp4", "One", Some("Jane"));
        api.seed_video("https://x/2.mp4", "Two", Some("Omar"));

        let document = export_document(&api, Some("Omar")).await.unwrap();
        assert_eq!(document.len(), 1);
        assert_eq!(document[0].annotator.as_deref(), Some("Omar"));
    }

    #[tokio::test]
    async fn any_failed_request_fails_the_export() {
        let api = FakeApi::default();
        let video = api.seed_video("https://x/1.mp4", "One", None);
        api.seed_query(video, "q");
        api.fail_next_with(500);

        assert!(export_document(&api, None).await.is_err());
    }

    #[tokio::test]
    async fn saved_export_matches_document() {
        let api = FakeApi::default();
        let video = api.seed_video("https://x/1.mp4", "One", Some("Jane Doe"));
        api.seed_query(video, "q");
        let document = export_document(&api, Some("Jane Doe")).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = save_export(dir.path(), Some("Jane Doe"), &document)
            .await
            .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("annotations_jane_doe_"));
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let reread: ExportDocument = serde_json::from_str(&written).unwrap();
        assert_eq!(reread, document);
    }
}
