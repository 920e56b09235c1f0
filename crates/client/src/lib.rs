//! Client side of the video annotation service.
//!
//! [`api::ApiClient`] talks to the REST API through the
//! [`api::AnnotationApi`] trait; [`view::ViewModel`] drives the screens
//! (tabs, navigation, banners, forms) on top of any implementation of it.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod view;

#[cfg(test)]
pub(crate) mod fake;
