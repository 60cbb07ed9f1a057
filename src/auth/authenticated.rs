use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::StatusCode;
use http::request::Parts;

use crate::utils::http_helpers::HTTPError;

/// Identity resolved by [`AuthenticationLayer`](super::AuthenticationLayer).
///
/// Extracting `Authenticated<V>` rejects with 401 when the request was not
/// authenticated; use `Option<Authenticated<V>>` for routes that also serve
/// anonymous callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated<V>(pub V);

impl<S, V> FromRequestParts<S> for Authenticated<V>
where
    S: Send + Sync,
    V: Clone + Send + Sync + 'static,
{
    type Rejection = HTTPError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated<V>>()
            .cloned()
            .ok_or_else(|| HTTPError::new(StatusCode::UNAUTHORIZED, "Not authenticated"))
    }
}

impl<S, V> OptionalFromRequestParts<S> for Authenticated<V>
where
    S: Send + Sync,
    V: Clone + Send + Sync + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Authenticated<V>>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn parts() -> Parts {
        Request::builder().uri("/").body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let mut parts = parts();
        let result =
            <Authenticated<String> as FromRequestParts<()>>::from_request_parts(&mut parts, &())
                .await;
        assert_eq!(result.unwrap_err().status(), StatusCode::UNAUTHORIZED);

        let optional = <Authenticated<String> as OptionalFromRequestParts<()>>::from_request_parts(
            &mut parts,
            &(),
        )
        .await
        .unwrap();
        assert!(optional.is_none());
    }

    #[tokio::test]
    async fn test_identity_is_read_from_extensions() {
        let mut parts = parts();
        parts.extensions.insert(Authenticated("alice".to_string()));

        let Authenticated(user) =
            <Authenticated<String> as FromRequestParts<()>>::from_request_parts(&mut parts, &())
                .await
                .unwrap();
        assert_eq!(user, "alice");

        // A different value type is a different identity.
        let other =
            <Authenticated<u64> as FromRequestParts<()>>::from_request_parts(&mut parts, &()).await;
        assert!(other.is_err());
    }
}
