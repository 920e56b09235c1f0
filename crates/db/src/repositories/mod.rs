//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. `*_tx` variants take an
//! open transaction so callers can compose multi-table writes.

pub mod annotation_repo;
pub mod export_repo;
pub mod query_repo;
pub mod submission_repo;
pub mod video_repo;

pub use annotation_repo::AnnotationRepo;
pub use export_repo::ExportRepo;
pub use query_repo::{QueryChanges, QueryRepo};
pub use submission_repo::SubmissionRepo;
pub use video_repo::VideoRepo;
