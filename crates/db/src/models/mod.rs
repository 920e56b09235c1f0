//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Count-enriched list rows where the API exposes derived counts
//! - `Deserialize` update DTOs (all `Option` fields) for patches
//!
//! Create payloads live in `annotator_core::submission` because the same
//! shapes are nested inside bulk submissions and export documents.

pub mod annotation;
pub mod query;
pub mod status;
pub mod video;
