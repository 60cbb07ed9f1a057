//! Response-editing capability.
//!
//! Handlers cannot touch the outgoing response while extracting from the
//! request, so header writes are queued on a [`ResponseEditor`] and applied by
//! [`ResponseEditingLayer`] once the inner service has produced its response.
//! A `ResponseEditor` can only be obtained on routes wrapped by that layer.

use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use futures::future::BoxFuture;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Request, Response};
use tower::{Layer, Service};
use tracing::error;

use crate::utils::http_helpers::HTTPError;

#[derive(Debug, Clone)]
enum HeaderEdit {
    Append(HeaderName, HeaderValue),
    Insert(HeaderName, HeaderValue),
    Remove(HeaderName),
}

/// Capability to mutate the response headers of the current request.
///
/// Only [`ResponseEditingLayer`] hands these out; code outside this crate
/// extracts one in a handler and cannot build its own:
///
/// ```compile_fail
/// use sessiontron::session::ResponseEditor;
///
/// let editor = ResponseEditor::default();
/// ```
///
/// ```compile_fail
/// use sessiontron::session::ResponseEditor;
///
/// let editor = ResponseEditor::new();
/// ```
#[derive(Clone, Debug)]
pub struct ResponseEditor {
    edits: Arc<Mutex<Vec<HeaderEdit>>>,
}

impl ResponseEditor {
    pub(crate) fn new() -> Self {
        ResponseEditor {
            edits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(&self, edit: HeaderEdit) {
        self.edits
            .lock()
            .expect("response editor mutex poisoned")
            .push(edit);
    }

    /// Adds a header value, keeping any existing values (e.g. `Set-Cookie`).
    pub fn append_header(&self, name: HeaderName, value: HeaderValue) {
        self.push(HeaderEdit::Append(name, value));
    }

    /// Sets a header, replacing any existing values.
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.push(HeaderEdit::Insert(name, value));
    }

    pub fn remove_header(&self, name: HeaderName) {
        self.push(HeaderEdit::Remove(name));
    }

    /// Applies queued edits in order.
    pub(crate) fn apply(&self, headers: &mut HeaderMap) {
        let edits = std::mem::take(
            &mut *self
                .edits
                .lock()
                .expect("response editor mutex poisoned"),
        );
        for edit in edits {
            match edit {
                HeaderEdit::Append(name, value) => {
                    headers.append(name, value);
                }
                HeaderEdit::Insert(name, value) => {
                    headers.insert(name, value);
                }
                HeaderEdit::Remove(name) => {
                    headers.remove(name);
                }
            }
        }
    }
}

impl<S> FromRequestParts<S> for ResponseEditor
where
    S: Send + Sync,
{
    type Rejection = HTTPError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ResponseEditor>().cloned().ok_or_else(|| {
            error!(
                "Route {} requires response editing but ResponseEditingLayer is not installed",
                parts.uri.path()
            );
            HTTPError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Response editing is not enabled for this route",
            )
        })
    }
}

/// Tower layer that grants [`ResponseEditor`] to the wrapped routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEditingLayer;

impl ResponseEditingLayer {
    pub fn new() -> Self {
        ResponseEditingLayer
    }
}

impl<S> Layer<S> for ResponseEditingLayer {
    type Service = ResponseEditingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseEditingService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseEditingService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ResponseEditingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let editor = ResponseEditor::new();
        req.extensions_mut().insert(editor.clone());
        let future = self.inner.call(req);
        Box::pin(async move {
            let mut response = future.await?;
            editor.apply(response.headers_mut());
            Ok(response)
        })
    }
}
