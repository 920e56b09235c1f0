pub mod annotation;
pub mod export;
pub mod query;
pub mod video;
