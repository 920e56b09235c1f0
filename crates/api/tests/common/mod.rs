#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use annotator_api::config::{ProbeKind, ServerConfig};
use annotator_api::router::build_app_router;
use annotator_api::state::AppState;
use annotator_core::probe::{DisabledProbe, DurationProbe, ProbeError};

/// Build a test `ServerConfig` with safe defaults and duration lookups off.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        probe_timeout_secs: 1,
        duration_probe: ProbeKind::Disabled,
        probe_concurrency: 4,
    }
}

/// Probe answering from a fixed URL → seconds table; unknown URLs fail.
#[derive(Debug, Default, Clone)]
pub struct StubProbe {
    pub durations: HashMap<String, i32>,
}

impl StubProbe {
    pub fn with(url: &str, secs: i32) -> Self {
        let mut durations = HashMap::new();
        durations.insert(url.to_string(), secs);
        Self { durations }
    }
}

#[async_trait]
impl DurationProbe for StubProbe {
    async fn duration_secs(&self, url: &str) -> Result<i32, ProbeError> {
        self.durations
            .get(url)
            .copied()
            .ok_or_else(|| ProbeError::Missing(url.to_string()))
    }
}

/// Build the full application router (same middleware stack as the binary)
/// with duration lookups disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_probe(pool, Arc::new(DisabledProbe))
}

pub fn build_test_app_with_probe(pool: PgPool, probe: Arc<dyn DurationProbe>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        probe,
    };
    build_app_router(state, &config)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(&body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(&body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// POST a raw (possibly malformed) JSON body.
pub async fn post_raw(app: Router, uri: &str, raw: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a payload and return the `data` object of the 201 response.
pub async fn submit(app: Router, payload: Value) -> Value {
    let response = post_json(app, "/api/v1/videos", payload).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
