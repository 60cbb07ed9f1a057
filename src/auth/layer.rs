//! Tower middleware running an [`Authenticator`] in front of the wrapped routes.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use http::Request;
use tower::{Layer, Service};
use tracing::{debug, info};

use super::authenticated::Authenticated;
use super::authenticator::Authenticator;
use crate::metrics::{Metrics, MetricsRecorder};

/// Layer producing [`AuthenticationService`].
///
/// Anonymous requests pass through untouched; whether they are acceptable is
/// decided by the handler extracting [`Authenticated`].
pub struct AuthenticationLayer<A> {
    authenticator: Arc<A>,
    metrics: Option<Metrics>,
}

impl<A> AuthenticationLayer<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<A> Clone for AuthenticationLayer<A> {
    fn clone(&self) -> Self {
        Self {
            authenticator: Arc::clone(&self.authenticator),
            metrics: self.metrics.clone(),
        }
    }
}

impl<S, A> Layer<S> for AuthenticationLayer<A> {
    type Service = AuthenticationService<S, A>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthenticationService {
            inner,
            authenticator: Arc::clone(&self.authenticator),
            metrics: self.metrics.clone(),
        }
    }
}

pub struct AuthenticationService<S, A> {
    inner: S,
    authenticator: Arc<A>,
    metrics: Option<Metrics>,
}

impl<S: Clone, A> Clone for AuthenticationService<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            authenticator: Arc::clone(&self.authenticator),
            metrics: self.metrics.clone(),
        }
    }
}

impl<S, A, B> Service<Request<B>> for AuthenticationService<S, A>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
    A: Authenticator,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let authenticator = Arc::clone(&self.authenticator);
        let metrics = self.metrics.clone();
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();
            let outcome = authenticator.authenticate(&parts).await;

            let result = match outcome {
                Ok(Some(value)) => {
                    debug!("Authenticator '{}' resolved an identity", authenticator.name());
                    parts.extensions.insert(Authenticated(value));
                    "authenticated"
                }
                Ok(None) => {
                    debug!("Authenticator '{}' found no identity", authenticator.name());
                    "anonymous"
                }
                Err(e) => {
                    info!(
                        "Authenticator '{}' rejected request to {}",
                        authenticator.name(),
                        parts.uri.path()
                    );
                    if let Some(metrics) = &metrics {
                        metrics.record_auth_attempt("rejected");
                    }
                    return Ok(e.into_response());
                }
            };
            if let Some(metrics) = &metrics {
                metrics.record_auth_attempt(result);
            }

            inner.call(Request::from_parts(parts, body)).await
        })
    }
}
