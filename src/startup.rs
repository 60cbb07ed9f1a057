//! Application startup and server initialization.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::routes;
use crate::session::SessionManager;
use crate::state::AppState;
use crate::store::create_store;

/// Builds the application state: metrics, the configured store and the session manager.
pub async fn build_state(config: Arc<ConfigV1>) -> Result<AppState, Box<dyn std::error::Error>> {
    let metrics = Metrics::new();
    let store = create_store(&config.store).await?;
    info!("Using session store '{}'", store.get_name());

    let sessions = SessionManager::new(Arc::new(config.session.clone()), store, metrics.clone());
    Ok(AppState::new(config, sessions, metrics))
}

/// Initializes and runs the application server until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the store cannot be created, the server fails to bind
/// to the configured address, or serving fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone()).await?;
    let app = routes::create_router(state);

    info!("Starting server on {}", config.bind_address);
    let listener = TcpListener::bind(&config.bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
