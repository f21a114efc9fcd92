//! Per-request context passed through the handler chain.
//!
//! # Responsibilities
//! - Hold the inbound request and the response being built
//! - Expose path parameters of the route currently executing
//! - Carry the chain cursor and the explicit "continue" signal
//!
//! # Design Decisions
//! - Contexts are pooled; every buffer is cleared, not dropped, on reset
//! - Parameter values are ranges into the owned path, so lookups never copy
//! - Parameters belong to the current route and are replaced when the chain
//!   moves on to the next matching route

use axum::body::Bytes;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{request, Extensions, HeaderMap, Method, Response, StatusCode, Uri};
use serde::Serialize;

use crate::dispatch::error::HandlerError;
use crate::routing::matcher::{Capture, PathSegments};

/// Mutable per-request state handed to every handler.
#[derive(Debug)]
pub struct Ctx {
    method: Method,
    uri: Uri,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,

    pub(crate) segments: PathSegments,
    pub(crate) captures: Vec<Capture>,
    pub(crate) route: Option<usize>,
    pub(crate) handler: usize,
    pub(crate) continued: bool,
    pub(crate) pending: Option<HandlerError>,

    status: StatusCode,
    response_headers: HeaderMap,
    response_body: Vec<u8>,

    pub(crate) leased: bool,
}

impl Ctx {
    pub(crate) fn new() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::default(),
            path: String::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            extensions: Extensions::new(),
            segments: PathSegments::default(),
            captures: Vec::new(),
            route: None,
            handler: 0,
            continued: false,
            pending: None,
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            response_body: Vec::new(),
            leased: false,
        }
    }

    /// Load an inbound request into this (freshly reset) context.
    pub(crate) fn load(&mut self, parts: request::Parts, body: Bytes) {
        self.method = parts.method;
        self.path.push_str(parts.uri.path());
        self.uri = parts.uri;
        self.headers = parts.headers;
        self.extensions = parts.extensions;
        self.body = body;
        self.segments.reset(&self.path);
    }

    /// Clear all request, routing and response state, keeping allocations.
    pub(crate) fn reset(&mut self) {
        self.method = Method::GET;
        self.uri = Uri::default();
        self.path.clear();
        self.headers.clear();
        self.body = Bytes::new();
        self.extensions.clear();
        self.segments.reset("");
        self.captures.clear();
        self.route = None;
        self.handler = 0;
        self.continued = false;
        self.pending = None;
        self.status = StatusCode::OK;
        self.response_headers.clear();
        self.response_body.clear();
    }

    /// Move the built response out of the context.
    pub(crate) fn take_response(&mut self) -> Response<Bytes> {
        let mut response = Response::new(Bytes::from(std::mem::take(&mut self.response_body)));
        *response.status_mut() = self.status;
        *response.headers_mut() = std::mem::take(&mut self.response_headers);
        response
    }

    pub(crate) fn split_for_match(&mut self) -> (&Method, &str, &PathSegments, &mut Vec<Capture>) {
        (&self.method, &self.path, &self.segments, &mut self.captures)
    }

    // ---- request ----

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The raw request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A request header as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Value of a path parameter of the current route, or `""` when absent.
    ///
    /// A wildcard capture is available under `"*"`.
    pub fn param(&self, name: &str) -> &str {
        self.captures
            .iter()
            .find(|c| &*c.name == name)
            .map_or("", |c| &self.path[c.value.clone()])
    }

    /// All captured parameters of the current route, in pattern order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures
            .iter()
            .map(|c| (&*c.name, &self.path[c.value.clone()]))
    }

    /// Typed per-request values shared between handlers in the chain.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    // ---- chain ----

    /// Continue with the next handler once this one returns.
    ///
    /// Without this call the chain stops after the current handler.
    pub fn next(&mut self) {
        self.continued = true;
    }

    /// Abort the chain and hand `err` to the error handler.
    pub fn next_with(&mut self, err: impl Into<HandlerError>) {
        self.pending = Some(err.into());
    }

    // ---- response ----

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn response_status(&self) -> StatusCode {
        self.status
    }

    /// Set (replace) a response header.
    pub fn set_header<K, V>(&mut self, key: K, value: V) -> Result<&mut Self, HandlerError>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        HandlerError: From<K::Error> + From<V::Error>,
    {
        self.response_headers.insert(key.try_into()?, value.try_into()?);
        Ok(self)
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Replace the response body.
    pub fn send(&mut self, body: impl AsRef<[u8]>) -> &mut Self {
        self.response_body.clear();
        self.response_body.extend_from_slice(body.as_ref());
        self
    }

    /// Append to the response body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> &mut Self {
        self.response_body.extend_from_slice(chunk.as_ref());
        self
    }

    /// Serialize `value` as the JSON response body.
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, HandlerError> {
        self.response_body.clear();
        serde_json::to_writer(&mut self.response_body, value)?;
        self.response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response_body
    }
}
