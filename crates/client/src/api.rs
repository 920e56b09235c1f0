//! REST API client for the annotation service.
//!
//! [`AnnotationApi`] is the seam the view model talks through;
//! [`ApiClient`] implements it over HTTP with [`reqwest`], unwrapping the
//! `{ "data": ... }` envelope and turning `{ "error", "code" }` bodies into
//! [`ClientError::Api`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use annotator_core::export::ExportDocument;
use annotator_core::submission::{AnnotationSubmission, QuerySubmission, VideoSubmission};
use annotator_core::types::DbId;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    Annotation, AnnotationUpdate, Query, QueryUpdate, SubmissionResult, Video, VideoUpdate,
};

/// Every operation the client performs against the service.
#[async_trait]
pub trait AnnotationApi: Send + Sync {
    async fn submit_video(&self, video: &VideoSubmission) -> Result<SubmissionResult, ClientError>;
    async fn submit_bulk(&self, videos: &[VideoSubmission])
        -> Result<SubmissionResult, ClientError>;

    async fn list_videos(&self, annotator: Option<&str>) -> Result<Vec<Video>, ClientError>;
    async fn get_video(&self, id: DbId) -> Result<Video, ClientError>;
    async fn update_video(&self, id: DbId, changes: &VideoUpdate) -> Result<Video, ClientError>;
    async fn set_video_status(&self, id: DbId, status: &str) -> Result<Video, ClientError>;
    async fn delete_video(&self, id: DbId) -> Result<(), ClientError>;

    async fn create_query(
        &self,
        video_id: DbId,
        query: &QuerySubmission,
    ) -> Result<Query, ClientError>;
    async fn list_queries(&self, video_id: DbId) -> Result<Vec<Query>, ClientError>;
    async fn update_query(&self, id: DbId, changes: &QueryUpdate) -> Result<Query, ClientError>;
    async fn set_query_status(&self, id: DbId, status: &str) -> Result<Query, ClientError>;
    async fn add_query_type(&self, id: DbId, query_type: &str) -> Result<Query, ClientError>;
    async fn remove_query_type(&self, id: DbId, query_type: &str) -> Result<Query, ClientError>;
    async fn delete_query(&self, id: DbId) -> Result<(), ClientError>;

    async fn create_annotation(
        &self,
        query_id: DbId,
        annotation: &AnnotationSubmission,
    ) -> Result<Annotation, ClientError>;
    async fn list_annotations(&self, query_id: DbId) -> Result<Vec<Annotation>, ClientError>;
    async fn update_annotation(
        &self,
        id: DbId,
        changes: &AnnotationUpdate,
    ) -> Result<Annotation, ClientError>;
    async fn set_annotated(&self, id: DbId, is_annotated: &str)
        -> Result<Annotation, ClientError>;
    async fn delete_annotation(&self, id: DbId) -> Result<(), ClientError>;

    /// Server-side nested export.
    async fn export(&self, annotator: Option<&str>) -> Result<ExportDocument, ClientError>;
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    status: &'a str,
}

#[derive(Serialize)]
struct AnnotatedBody<'a> {
    is_annotated: &'a str,
}

#[derive(Serialize)]
struct QueryTypeBody<'a> {
    query_type: &'a str,
}

/// HTTP implementation of [`AnnotationApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.api_url)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or the decoded API error.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (parsed.code, parsed.error),
            Err(_) => ("HTTP_ERROR".to_string(), body),
        };
        tracing::debug!(status = status.as_u16(), %code, %message, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await.map(|_| ())
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        annotator: Option<&str>,
    ) -> Result<T, ClientError> {
        let mut request = self.client.get(self.url(path));
        if let Some(name) = annotator {
            request = request.query(&[("annotator", name)]);
        }
        Self::parse_data(request.send().await?).await
    }

    async fn post_data<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::parse_data(response).await
    }

    async fn put_data<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::parse_data(response).await
    }

    async fn delete_path(&self, path: &str) -> Result<(), ClientError> {
        let response = self.client.delete(self.url(path)).send().await?;
        Self::check_status(response).await
    }
}

#[async_trait]
impl AnnotationApi for ApiClient {
    async fn submit_video(&self, video: &VideoSubmission) -> Result<SubmissionResult, ClientError> {
        self.post_data("/videos", video).await
    }

    async fn submit_bulk(
        &self,
        videos: &[VideoSubmission],
    ) -> Result<SubmissionResult, ClientError> {
        self.post_data("/videos/bulk", videos).await
    }

    async fn list_videos(&self, annotator: Option<&str>) -> Result<Vec<Video>, ClientError> {
        self.get_data("/videos", annotator).await
    }

    async fn get_video(&self, id: DbId) -> Result<Video, ClientError> {
        self.get_data(&format!("/videos/{id}"), None).await
    }

    async fn update_video(&self, id: DbId, changes: &VideoUpdate) -> Result<Video, ClientError> {
        self.put_data(&format!("/videos/{id}"), changes).await
    }

    async fn set_video_status(&self, id: DbId, status: &str) -> Result<Video, ClientError> {
        self.put_data(&format!("/videos/{id}/status"), &StatusBody { status })
            .await
    }

    async fn delete_video(&self, id: DbId) -> Result<(), ClientError> {
        self.delete_path(&format!("/videos/{id}")).await
    }

    async fn create_query(
        &self,
        video_id: DbId,
        query: &QuerySubmission,
    ) -> Result<Query, ClientError> {
        self.post_data(&format!("/videos/{video_id}/queries"), query)
            .await
    }

    async fn list_queries(&self, video_id: DbId) -> Result<Vec<Query>, ClientError> {
        self.get_data(&format!("/videos/{video_id}/queries"), None)
            .await
    }

    async fn update_query(&self, id: DbId, changes: &QueryUpdate) -> Result<Query, ClientError> {
        self.put_data(&format!("/queries/{id}"), changes).await
    }

    async fn set_query_status(&self, id: DbId, status: &str) -> Result<Query, ClientError> {
        self.put_data(&format!("/queries/{id}/status"), &StatusBody { status })
            .await
    }

    async fn add_query_type(&self, id: DbId, query_type: &str) -> Result<Query, ClientError> {
        self.post_data(&format!("/queries/{id}/types"), &QueryTypeBody { query_type })
            .await
    }

    async fn remove_query_type(&self, id: DbId, query_type: &str) -> Result<Query, ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/queries/{id}/types/{query_type}")))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    async fn delete_query(&self, id: DbId) -> Result<(), ClientError> {
        self.delete_path(&format!("/queries/{id}")).await
    }

    async fn create_annotation(
        &self,
        query_id: DbId,
        annotation: &AnnotationSubmission,
    ) -> Result<Annotation, ClientError> {
        self.post_data(&format!("/queries/{query_id}/annotations"), annotation)
            .await
    }

    async fn list_annotations(&self, query_id: DbId) -> Result<Vec<Annotation>, ClientError> {
        self.get_data(&format!("/queries/{query_id}/annotations"), None)
            .await
    }

    async fn update_annotation(
        &self,
        id: DbId,
        changes: &AnnotationUpdate,
    ) -> Result<Annotation, ClientError> {
        self.put_data(&format!("/annotations/{id}"), changes).await
    }

    async fn set_annotated(
        &self,
        id: DbId,
        is_annotated: &str,
    ) -> Result<Annotation, ClientError> {
        self.put_data(
            &format!("/annotations/{id}/annotated"),
            &AnnotatedBody { is_annotated },
        )
        .await
    }

    async fn delete_annotation(&self, id: DbId) -> Result<(), ClientError> {
        self.delete_path(&format!("/annotations/{id}")).await
    }

    async fn export(&self, annotator: Option<&str>) -> Result<ExportDocument, ClientError> {
        self.get_data("/export", annotator).await
    }
}
