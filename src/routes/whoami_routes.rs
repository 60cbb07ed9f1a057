//! Identity endpoint guarded by session authentication.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::auth::{Authenticated, AuthenticationLayer, SessionAuthenticator};
use crate::state::AppState;

/// Registers `/whoami`; the session payload is the identity.
pub fn routes(state: &AppState) -> Router<AppState> {
    let layer = AuthenticationLayer::new(SessionAuthenticator::<Value>::new(state.sessions.clone()))
        .with_metrics(state.metrics.clone());

    Router::new()
        .route("/whoami", get(whoami))
        .route_layer(layer)
}

async fn whoami(Authenticated(identity): Authenticated<Value>) -> impl IntoResponse {
    Json(identity)
}
