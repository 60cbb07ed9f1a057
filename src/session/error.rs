use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;
use crate::utils::http_helpers::HTTPError;

/// Errors surfaced by [`Session`](super::Session) operations.
///
/// `SessionDoesNotExist` is the only session-level failure; everything else
/// comes from the store or from (de)serializing the payload.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session does not exist")]
    SessionDoesNotExist,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to serialize session payload: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to deserialize session payload: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("Invalid session header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("Invalid session header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
}

impl From<SessionError> for HTTPError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::SessionDoesNotExist => {
                HTTPError::new(StatusCode::NOT_FOUND, e.to_string())
            }
            SessionError::Store(StoreError::Disabled) => {
                HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
            other => {
                error!("Session error: {}", other);
                HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, "Session error")
            }
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        HTTPError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            HTTPError::from(SessionError::SessionDoesNotExist).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HTTPError::from(SessionError::Store(StoreError::Disabled)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            HTTPError::from(SessionError::Store(StoreError::Backend("boom".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_pass_through_unchanged() {
        let err = SessionError::from(StoreError::Backend("connection reset".into()));
        assert_eq!(err.to_string(), StoreError::Backend("connection reset".into()).to_string());
        assert!(matches!(
            err,
            SessionError::Store(StoreError::Backend(ref m)) if m == "connection reset"
        ));
    }
}
