//! HTTP route definitions and handlers.
//!
//! Session management, an authenticated identity endpoint, health checks
//! and metrics.

mod health_routes;
mod metrics_routes;
mod session_routes;
mod whoami_routes;

use crate::session::ResponseEditingLayer;
use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// Every route may edit its response headers, which is what lets session
/// handlers hand identifiers back to the client.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(session_routes::routes())
        .merge(whoami_routes::routes(&state))
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .layer(ResponseEditingLayer::new())
        .with_state(state)
}
