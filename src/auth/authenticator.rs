use async_trait::async_trait;
use axum::response::IntoResponse;
use futures::future::BoxFuture;
use http::request::Parts;

/// Request authentication written as a plain `async fn`.
///
/// `Ok(None)` means the request carries no usable identity; what happens
/// next is up to the middleware consuming the result.
#[async_trait]
pub trait AsyncAuthenticator: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;
    type Error: IntoResponse + Send + 'static;

    fn get_name(&self) -> &str;

    async fn authenticate(&self, parts: &Parts) -> Result<Option<Self::Value>, Self::Error>;
}

/// Future-returning contract consumed by [`AuthenticationLayer`](super::AuthenticationLayer).
pub trait Authenticator: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;
    type Error: IntoResponse + Send + 'static;

    fn name(&self) -> &str;

    fn authenticate<'a>(
        &'a self,
        parts: &'a Parts,
    ) -> BoxFuture<'a, Result<Option<Self::Value>, Self::Error>>;
}

impl<A> Authenticator for A
where
    A: AsyncAuthenticator,
{
    type Value = A::Value;
    type Error = A::Error;

    fn name(&self) -> &str {
        AsyncAuthenticator::get_name(self)
    }

    fn authenticate<'a>(
        &'a self,
        parts: &'a Parts,
    ) -> BoxFuture<'a, Result<Option<Self::Value>, Self::Error>> {
        AsyncAuthenticator::authenticate(self, parts)
    }
}
