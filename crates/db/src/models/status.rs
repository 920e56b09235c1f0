//! Restricted-field update bodies.

use serde::Deserialize;

/// Body of the video and query status endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Body of `PUT /annotations/{id}/annotated`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotatedFlagUpdate {
    pub is_annotated: String,
}
