use std::sync::Arc;

use annotator_core::probe::DurationProbe;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: annotator_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Looks up durations for submitted videos that omit one.
    pub probe: Arc<dyn DurationProbe>,
}
