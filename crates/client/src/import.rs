//! Loading submission documents from JSON files.
//!
//! An import file holds either one video object or an array of them, in
//! the same shape the export produces.

use std::path::Path;

use annotator_core::submission::{validate_batch, SubmissionPayload, VideoSubmission};

use crate::error::ClientError;

/// Parse and pre-validate an import document.
///
/// Validation runs locally so an obviously broken file is reported
/// without a round trip; the server validates again on submit.
pub fn parse_import(raw: &str) -> Result<Vec<VideoSubmission>, ClientError> {
    let payload: SubmissionPayload = serde_json::from_str(raw)?;
    let videos = payload.into_videos();
    validate_batch(&videos).map_err(ClientError::Invalid)?;
    Ok(videos)
}

/// Read an import document from disk.
pub async fn load_import_file(path: &Path) -> Result<Vec<VideoSubmission>, ClientError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let videos = parse_import(&raw)?;
    tracing::debug!(path = %path.display(), videos = videos.len(), "Import file loaded");
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn single_object_and_array_both_load() {
        let one = parse_import(r#"{"url": "https://x/a.mp4", "title": "A"}"#).unwrap();
        assert_eq!(one.len(), 1);

        let many = parse_import(
            r#"[{"url": "https://x/a.mp4", "title": "A"},
                {"url": "https://x/b.mp4", "title": "B", "queries": [{"query_text": "q"}]}]"#,
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].queries.len(), 1);
    }

    #[test]
    fn invalid_document_reports_path() {
        let err = parse_import(r#"[{"url": "https://x/a.mp4"}]"#).unwrap_err();
        assert_matches!(err, ClientError::Invalid(msg) if msg == "videos[0]: title is required");
    }

    #[test]
    fn malformed_json_is_json_error() {
        assert_matches!(parse_import("[{"), Err(ClientError::Json(_)));
        assert_matches!(parse_import("[]"), Err(ClientError::Invalid(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let result = load_import_file(Path::new("/nonexistent/import.json")).await;
        assert_matches!(result, Err(ClientError::Io(_)));
    }
}
