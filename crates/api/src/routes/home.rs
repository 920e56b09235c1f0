//! Service information at `/`.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Every route the service exposes, as `METHOD path`.
pub const ENDPOINTS: &[&str] = &[
    "GET    /health",
    "POST   /api/v1/videos",
    "POST   /api/v1/videos/bulk",
    "GET    /api/v1/videos",
    "GET    /api/v1/videos/{id}",
    "PUT    /api/v1/videos/{id}",
    "PUT    /api/v1/videos/{id}/status",
    "DELETE /api/v1/videos/{id}",
    "POST   /api/v1/videos/{id}/queries",
    "GET    /api/v1/videos/{id}/queries",
    "GET    /api/v1/queries/{id}",
    "PUT    /api/v1/queries/{id}",
    "PUT    /api/v1/queries/{id}/status",
    "POST   /api/v1/queries/{id}/types",
    "DELETE /api/v1/queries/{id}/types/{query_type}",
    "DELETE /api/v1/queries/{id}",
    "POST   /api/v1/queries/{id}/annotations",
    "GET    /api/v1/queries/{id}/annotations",
    "GET    /api/v1/annotations/{id}",
    "PUT    /api/v1/annotations/{id}",
    "PUT    /api/v1/annotations/{id}/annotated",
    "DELETE /api/v1/annotations/{id}",
    "GET    /api/v1/export",
];

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

/// GET / -- service name, version and endpoint listing.
async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "Video Annotation API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(service_info))
}
