//! Session endpoints: store, read, replace and end the caller's session.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::session::{ResponseEditor, Session, SessionError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/session",
        post(create_session)
            .get(read_session)
            .put(update_session)
            .delete(delete_session),
    )
}

/// Optional per-request expiry override.
#[derive(Debug, Deserialize)]
struct ExpiryQuery {
    expires_in_s: Option<u64>,
}

impl ExpiryQuery {
    fn resolve(&self, state: &AppState) -> Duration {
        self.expires_in_s
            .map(Duration::from_secs)
            .unwrap_or_else(|| state.config.session.default_expiry())
    }
}

#[derive(Debug, Serialize)]
struct Created {
    id: String,
}

/// Stores the JSON body under a new session identifier.
async fn create_session(
    State(state): State<AppState>,
    Query(query): Query<ExpiryQuery>,
    session: Session,
    editor: ResponseEditor,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, SessionError> {
    let id = session
        .save(&editor, &payload, query.resolve(&state))
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id: id.to_string() })))
}

async fn read_session(session: Session) -> Result<impl IntoResponse, SessionError> {
    match session.load::<Value>().await? {
        Some(payload) => Ok(Json(payload)),
        None => Err(SessionError::SessionDoesNotExist),
    }
}

/// Replaces the payload of an existing session, keeping its identifier.
async fn update_session(
    State(state): State<AppState>,
    Query(query): Query<ExpiryQuery>,
    session: Session,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, SessionError> {
    session.update(&payload, query.resolve(&state)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Logout: drops the stored payload and tells the client to forget its identifier.
async fn delete_session(
    session: Session,
    editor: ResponseEditor,
) -> Result<impl IntoResponse, SessionError> {
    session.delete().await?;
    session.clear_id(&editor)?;
    debug!("Session ended");
    Ok(StatusCode::NO_CONTENT)
}
