//! Request view handed to the binder.
//!
//! A [`BindContext`] carries the parts of an HTTP request the binder reads:
//! method, URI, headers and the buffered body. It is framework-neutral, so
//! any server stack that can produce `http` types and a byte body can feed
//! the binder.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// All request data a bind call reads from.
///
/// # Example
///
/// ```rust
/// use paramware::BindContext;
/// use http::{Method, Uri};
///
/// let ctx = BindContext::builder()
///     .method(Method::GET)
///     .uri(Uri::from_static("/users/42?active=true"))
///     .build();
///
/// assert_eq!(ctx.path(), "/users/42");
/// assert_eq!(ctx.query_string(), Some("active=true"));
/// ```
#[derive(Debug, Clone)]
pub struct BindContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl BindContext {
    /// Creates a context from its parts.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// Returns a builder for assembling a context.
    #[must_use]
    pub fn builder() -> BindContextBuilder {
        BindContextBuilder::new()
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The query string, when present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The buffered request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// A single header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a header as strings, non-UTF-8 values skipped.
    pub fn header_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// The `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the request body is empty.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Builder for a [`BindContext`].
#[derive(Debug, Default)]
pub struct BindContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
}

impl BindContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Sets all headers at once.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a single header.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the context.
    ///
    /// # Panics
    ///
    /// Panics if method or uri were not set.
    #[must_use]
    pub fn build(self) -> BindContext {
        BindContext {
            method: self.method.expect("method is required"),
            uri: self.uri.expect("uri is required"),
            headers: self.headers,
            body: self.body,
        }
    }
}
