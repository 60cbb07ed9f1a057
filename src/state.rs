//! Shared application state.
//!
//! Holds what every handler may need: configuration, the session manager
//! and the metrics registry.

use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::session::SessionManager;
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Session manager bound to the configured store.
    pub sessions: SessionManager,
    /// Prometheus metrics collector.
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Arc<ConfigV1>, sessions: SessionManager, metrics: Metrics) -> Self {
        Self {
            config,
            sessions,
            metrics,
        }
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
