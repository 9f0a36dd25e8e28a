use std::sync::Arc;

use tracklane_core::service::WorkItemService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Lifecycle engine bound to the configured store and the system clock.
    pub service: WorkItemService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
