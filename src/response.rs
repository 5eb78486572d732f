//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! A response is the triple the rest of the stack agrees on: a status code,
//! ordered unique-key [`Headers`], and a [`Body`] that is either fully
//! buffered or an iterator of chunks emitted one at a time.

use bytes::Bytes;

use crate::headers::Headers;

// ── Body ─────────────────────────────────────────────────────────────────────

/// A boxed, single-traversal chunk iterator used for streaming bodies.
///
/// The transport pulls one item at a time and writes it before pulling the
/// next, so a body of N chunks produces exactly N ordered writes. Once
/// consumed it cannot be restarted.
pub type Chunks = Box<dyn Iterator<Item = Bytes> + Send + 'static>;

/// A response body: fully buffered bytes, or a lazy chunk sequence.
pub enum Body {
    Full(Bytes),
    Stream(Chunks),
}

impl Body {
    pub fn full(bytes: impl Into<Bytes>) -> Self {
        Self::Full(bytes.into())
    }

    pub fn stream<I>(items: I) -> Self
    where
        I: IntoIterator + Send + 'static,
        I::IntoIter: Send + 'static,
        I::Item: Into<Bytes>,
    {
        Self::Stream(Box::new(items.into_iter().map(Into::into)))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Consumes the body into its chunk iterator. A buffered body becomes a
    /// single chunk.
    pub fn into_chunks(self) -> Chunks {
        match self {
            Self::Full(bytes) => Box::new(std::iter::once(bytes)),
            Self::Stream(chunks) => chunks,
        }
    }

    /// Drains the body into one buffer. Defeats streaming; meant for tests
    /// and error paths, not the serving path.
    pub fn collect(self) -> Bytes {
        match self {
            Self::Full(bytes) => bytes,
            Self::Stream(chunks) => {
                let mut buf = Vec::new();
                for chunk in chunks {
                    buf.extend_from_slice(&chunk);
                }
                buf.into()
            }
        }
    }
}

// ── ContentType ──────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    EventStream, // text/event-stream  (SSE)
    Html,        // text/html; charset=utf-8
    Json,        // application/json
    OctetStream, // application/octet-stream  (binary / file download)
    Text,        // text/plain; charset=utf-8
    Xml,         // application/xml
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::EventStream => "text/event-stream",
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text => "text/plain; charset=utf-8",
            Self::Xml => "application/xml",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use obi::Response;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::empty(204);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use obi::Response;
///
/// Response::builder()
///     .status(201)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
pub struct Response {
    status: u16,
    headers: Headers,
    body: Body,
}

impl Response {
    /// `200 OK` — `application/json`.
    ///
    /// Pass bytes from your serialiser directly — no intermediate allocation:
    /// `serde_json::to_vec(&val).unwrap()` or `format!(...).into_bytes()`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::with_content_type("application/json", Body::full(body))
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type("text/plain; charset=utf-8", Body::full(body.into()))
    }

    /// `200 OK` — a streaming body with no content type; hyper emits it
    /// chunk by chunk.
    pub fn stream<I>(items: I) -> Self
    where
        I: IntoIterator + Send + 'static,
        I::IntoIter: Send + 'static,
        I::Item: Into<Bytes>,
    {
        Self::from_parts(200, Headers::new(), Body::stream(items))
    }

    /// Response with the given status and no body.
    pub fn empty(status: u16) -> Self {
        Self::from_parts(status, Headers::new(), Body::full(Bytes::new()))
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Headers::new(), status: 200 }
    }

    pub fn from_parts(status: u16, headers: Headers, body: Body) -> Self {
        Self { status, headers, body }
    }

    pub fn into_parts(self) -> (u16, Headers, Body) {
        (self.status, self.headers, self.body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    fn with_content_type(content_type: &str, body: Body) -> Self {
        let mut headers = Headers::new();
        headers.set("content-type", content_type);
        Self { status: 200, headers, body }
    }
}

// ── ResponseBuilder ──────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200`. Terminated by a
/// typed body method — you always know what you're sending.
pub struct ResponseBuilder {
    headers: Headers,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish("application/json", Body::full(body))
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish("text/plain; charset=utf-8", Body::full(body.into()))
    }

    /// Terminate with a typed body. Use this for XML, HTML, binary, etc.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type.as_str(), Body::full(body))
    }

    /// Terminate with a typed streaming body (e.g. `ContentType::EventStream`).
    pub fn stream<I>(self, content_type: ContentType, items: I) -> Response
    where
        I: IntoIterator + Send + 'static,
        I::IntoIter: Send + 'static,
        I::Item: Into<Bytes>,
    {
        self.finish(content_type.as_str(), Body::stream(items))
    }

    /// Terminate with no body (e.g. `204`, `304`).
    pub fn no_body(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Body::full(Bytes::new()) }
    }

    fn finish(mut self, content_type: &str, body: Body) -> Response {
        if !self.headers.contains("content-type") {
            self.headers.set("content-type", content_type);
        }
        Response { status: self.status, headers: self.headers, body }
    }
}

// ── IntoResponse ─────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

/// Return a bare status code directly from a handler: `return 404`.
impl IntoResponse for u16 {
    fn into_response(self) -> Response {
        Response::empty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_body_is_one_chunk() {
        let chunks: Vec<Bytes> = Body::full("hi").into_chunks().collect();
        assert_eq!(chunks, [Bytes::from("hi")]);
    }

    #[test]
    fn stream_body_keeps_chunk_boundaries() {
        let body = Body::stream(["a", "b", "c"]);
        assert!(body.is_stream());
        let chunks: Vec<Bytes> = body.into_chunks().collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(Body::stream(["a", "b", "c"]).collect(), Bytes::from("abc"));
    }

    #[test]
    fn builder_respects_explicit_content_type() {
        let response = Response::builder()
            .header("content-type", "application/vnd.api+json")
            .json(r#"{}"#.as_bytes().to_vec());
        assert_eq!(response.headers().get("content-type"), Some("application/vnd.api+json"));
    }
}
