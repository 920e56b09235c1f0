//! Domain layer for the video annotation service.
//!
//! Holds everything that does not touch the database or HTTP: workflow
//! vocabularies, field validation, `HH:MM:SS` arithmetic, the nested
//! submission/export document types, the timeline layout used by the
//! client, and the best-effort duration probe.

pub mod error;
pub mod export;
pub mod probe;
pub mod submission;
pub mod timeline;
pub mod timestamp;
pub mod types;
pub mod workflow;
