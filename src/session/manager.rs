use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{FromRef, FromRequestParts};
use cookie::Cookie;
use http::header::SET_COOKIE;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::editor::ResponseEditor;
use super::error::SessionError;
use super::id::{create_session_id, SessionId};
use super::location::SessionIdLocation;
use crate::config::SessionConfig;
use crate::metrics::{Metrics, MetricsRecorder};
use crate::store::{SessionStore, StoreError};

/// Shared entry point to sessions: immutable configuration plus the store.
///
/// Cheap to clone. Put it in the router state and extract [`Session`] in handlers.
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    store: Arc<dyn SessionStore>,
    metrics: Metrics,
}

impl SessionManager {
    pub fn new(config: Arc<SessionConfig>, store: Arc<dyn SessionStore>, metrics: Metrics) -> Self {
        Self {
            config,
            store,
            metrics,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Binds a session handle to the given request headers.
    pub fn session(&self, headers: &HeaderMap) -> Session {
        Session {
            incoming: self.config.id_location.read(headers),
            manager: self.clone(),
        }
    }
}

/// Per-request session handle.
///
/// Holds the identifier presented by the request (if any) and performs
/// storage operations against it. Nothing is cached: every `load` hits the store.
#[derive(Clone)]
pub struct Session {
    incoming: Option<SessionId>,
    manager: SessionManager,
}

impl Session {
    fn location(&self) -> &SessionIdLocation {
        &self.manager.config.id_location
    }

    fn store(&self) -> &dyn SessionStore {
        self.manager.store.as_ref()
    }

    fn record(&self, operation: &str, result: &str) {
        self.manager
            .metrics
            .record_session_operation(operation, result);
    }

    fn record_store_call(&self, operation: &str, started: Instant) {
        self.manager.metrics.record_store_duration(
            operation,
            self.store().get_name(),
            started.elapsed().as_secs_f64(),
        );
    }

    fn record_store_error(&self, operation: &str, e: &StoreError) {
        warn!("Session store '{}' failed to {}: {}", self.store().get_name(), operation, e);
        self.record(operation, "error");
    }

    /// The identifier carried by the incoming request, if any.
    pub fn get_id(&self) -> Option<&SessionId> {
        self.incoming.as_ref()
    }

    /// Stores `payload` under a freshly generated identifier and sends that
    /// identifier back to the client.
    ///
    /// A new identifier is allocated even when the request already carries
    /// one; use [`Session::update`] to keep the current identifier.
    pub async fn save<T>(
        &self,
        editor: &ResponseEditor,
        payload: &T,
        expires_in: Duration,
    ) -> Result<SessionId, SessionError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_vec(payload).map_err(SessionError::Serialize)?;
        let id = create_session_id();

        let started = Instant::now();
        let saved = self.store().save(id.as_str(), &value, expires_in).await;
        self.record_store_call("save", started);
        if let Err(e) = saved {
            self.record_store_error("save", &e);
            return Err(e.into());
        }

        self.set_id(editor, &id, expires_in)?;
        self.record("save", "ok");
        debug!("Saved new session ({} bytes)", value.len());
        Ok(id)
    }

    /// Replaces the payload of the current session and refreshes its expiry.
    ///
    /// Fails with [`SessionError::SessionDoesNotExist`] when the request has no
    /// identifier or the store holds nothing under it. Never creates a session
    /// and never changes the identifier.
    pub async fn update<T>(&self, payload: &T, expires_in: Duration) -> Result<(), SessionError>
    where
        T: Serialize + ?Sized,
    {
        let Some(id) = self.get_id() else {
            debug!("Update requested without a session identifier");
            self.record("update", "missing");
            return Err(SessionError::SessionDoesNotExist);
        };
        let value = serde_json::to_vec(payload).map_err(SessionError::Serialize)?;

        let started = Instant::now();
        let updated = self.store().update(id.as_str(), &value, expires_in).await;
        self.record_store_call("update", started);
        match updated {
            Ok(true) => {
                self.record("update", "ok");
                Ok(())
            }
            Ok(false) => {
                debug!("Update requested for a session that is not in the store");
                self.record("update", "missing");
                Err(SessionError::SessionDoesNotExist)
            }
            Err(e) => {
                self.record_store_error("update", &e);
                Err(e.into())
            }
        }
    }

    /// Loads the current session payload as `T`.
    ///
    /// `Ok(None)` means there is no session: either the request carries no
    /// identifier or the store has nothing under it. A stored payload that
    /// does not match `T` is an error, not `None`.
    pub async fn load<T>(&self) -> Result<Option<T>, SessionError>
    where
        T: DeserializeOwned,
    {
        let Some(id) = self.get_id() else {
            self.record("load", "empty");
            return Ok(None);
        };

        let started = Instant::now();
        let loaded = self.store().load(id.as_str()).await;
        self.record_store_call("load", started);
        let value = match loaded {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("Session identifier present but no stored session");
                self.record("load", "miss");
                return Ok(None);
            }
            Err(e) => {
                self.record_store_error("load", &e);
                return Err(e.into());
            }
        };

        match serde_json::from_slice(&value) {
            Ok(payload) => {
                self.record("load", "ok");
                Ok(Some(payload))
            }
            Err(e) => {
                warn!("Stored session does not match the requested type: {}", e);
                self.record("load", "error");
                Err(SessionError::Deserialize(e))
            }
        }
    }

    /// Removes the stored payload. A request without identifier is a no-op.
    ///
    /// The client keeps its identifier; call [`Session::clear_id`] as well to
    /// end the session on the client side.
    pub async fn delete(&self) -> Result<(), SessionError> {
        let Some(id) = self.get_id() else {
            self.record("delete", "empty");
            return Ok(());
        };

        let started = Instant::now();
        let deleted = self.store().delete(id.as_str()).await;
        self.record_store_call("delete", started);
        match deleted {
            Ok(()) => {
                self.record("delete", "ok");
                Ok(())
            }
            Err(e) => {
                self.record_store_error("delete", &e);
                Err(e.into())
            }
        }
    }

    /// Writes `id` to the configured cookie or header of the response.
    pub fn set_id(
        &self,
        editor: &ResponseEditor,
        id: &SessionId,
        expires_in: Duration,
    ) -> Result<(), SessionError> {
        match self.location() {
            SessionIdLocation::Cookie { name } => {
                let max_age = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);
                let cookie = self
                    .cookie(name, id.to_string())
                    .max_age(time::Duration::seconds(max_age))
                    .build();
                editor.append_header(SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
            }
            SessionIdLocation::Header { name } => {
                editor.insert_header(header_name(name)?, HeaderValue::from_str(id.as_str())?);
            }
        }
        Ok(())
    }

    /// Tells the client to drop its identifier: an expired cookie, or no header.
    pub fn clear_id(&self, editor: &ResponseEditor) -> Result<(), SessionError> {
        match self.location() {
            SessionIdLocation::Cookie { name } => {
                let mut cookie = self.cookie(name, String::new()).build();
                cookie.make_removal();
                editor.append_header(SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
            }
            SessionIdLocation::Header { name } => {
                editor.remove_header(header_name(name)?);
            }
        }
        Ok(())
    }

    fn cookie(&self, name: &str, value: String) -> cookie::CookieBuilder<'static> {
        let attributes = &self.manager.config.cookie;
        let mut builder = Cookie::build((name.to_string(), value))
            .path(attributes.path.clone())
            .secure(attributes.secure)
            .http_only(attributes.http_only)
            .same_site(attributes.same_site.into());
        if let Some(domain) = &attributes.domain {
            builder = builder.domain(domain.clone());
        }
        builder
    }
}

fn header_name(name: &str) -> Result<HeaderName, SessionError> {
    Ok(HeaderName::from_bytes(name.as_bytes())?)
}

impl<S> FromRequestParts<S> for Session
where
    SessionManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionManager::from_ref(state).session(&parts.headers))
    }
}
