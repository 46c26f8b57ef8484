//! Request context types.
//!
//! The [`RequestContext`] is created per dispatch call. It carries the
//! already-parsed method, path and header bag, and collects everything the
//! request emits: body output, status and response headers. It is turned
//! into a [`Response`] once the request lifecycle completes.

use http::header::{HeaderName, HeaderValue, HOST, USER_AGENT};
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// # Example
///
/// ```
/// use zephyr_core::RequestId;
///
/// let a = RequestId::new();
/// let b = RequestId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request context handed to filters, handlers and error handlers.
///
/// # Example
///
/// ```
/// use zephyr_core::RequestContext;
/// use http::Method;
///
/// let mut ctx = RequestContext::new(Method::GET, "/admin/posts/5");
/// ctx.write("5");
/// assert_eq!(ctx.output(), "5");
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    headers: HeaderMap,
    output: String,
    status: Option<StatusCode>,
    response_headers: HeaderMap,
}

impl RequestContext {
    /// Creates a context for a synthetic request with no headers.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self::with_headers(method, path, HeaderMap::new())
    }

    /// Creates a context with an explicit header bag.
    #[must_use]
    pub fn with_headers(method: Method, path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            headers,
            output: String::new(),
            status: None,
            response_headers: HeaderMap::new(),
        }
    }

    /// Creates a context from a parsed `http` request, ignoring its body.
    ///
    /// Only the URI path is kept; the query string is left to collaborators.
    #[must_use]
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        Self::with_headers(
            request.method().clone(),
            request.uri().path(),
            request.headers().clone(),
        )
    }

    /// Adds a request header, builder style.
    ///
    /// Invalid header values are ignored.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path exactly as received.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the `User-Agent` header, if present and valid UTF-8.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }

    /// Returns the `Host` header, if present and valid UTF-8.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.headers.get(HOST).and_then(|v| v.to_str().ok())
    }

    /// Appends to the output buffer.
    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Returns everything written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Discards everything written so far.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Takes the output buffer, leaving it empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Sets the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Returns the response status set so far.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Emits a response header, replacing any previous value.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    /// Returns the response headers emitted so far.
    #[must_use]
    pub const fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Finishes the request and produces its response.
    #[must_use]
    pub fn into_response(self, halted: bool) -> Response {
        Response {
            status: self.status.unwrap_or(StatusCode::OK),
            headers: self.response_headers,
            body: self.output,
            halted,
        }
    }
}

impl fmt::Write for RequestContext {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

/// The response produced by one dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response status (200 unless something set it).
    pub status: StatusCode,
    /// Emitted response headers.
    pub headers: HeaderMap,
    /// Emitted body output.
    pub body: String,
    /// The error boundary asked the host to halt after sending this response.
    pub halted: bool,
}

impl Response {
    /// Converts into an `http` response.
    #[must_use]
    pub fn into_http(self) -> http::Response<String> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
