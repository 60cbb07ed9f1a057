use std::marker::PhantomData;

use async_trait::async_trait;
use http::request::Parts;
use serde::de::DeserializeOwned;

use super::authenticator::AsyncAuthenticator;
use crate::session::{SessionError, SessionManager};

/// Authenticates a request by loading its session payload as `T`.
///
/// A request without a session, or whose session has expired, is anonymous.
pub struct SessionAuthenticator<T> {
    sessions: SessionManager,
    _payload: PhantomData<fn() -> T>,
}

impl<T> SessionAuthenticator<T> {
    pub fn new(sessions: SessionManager) -> Self {
        Self {
            sessions,
            _payload: PhantomData,
        }
    }
}

#[async_trait]
impl<T> AsyncAuthenticator for SessionAuthenticator<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Value = T;
    type Error = SessionError;

    fn get_name(&self) -> &str {
        "session"
    }

    async fn authenticate(&self, parts: &Parts) -> Result<Option<T>, SessionError> {
        self.sessions.session(&parts.headers).load::<T>().await
    }
}
