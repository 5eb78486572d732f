//! Block endpoints and their per-request execution context.
//!
//! A block endpoint is a closure over a [`Context`]: a sandbox holding the
//! request plus the response state accumulated so far — status (default
//! `200`), ordered unique-key headers, and an optional body. The closure
//! returns a [`Flow`], which is where the control protocol lives:
//!
//! - finish normally with `Ok(reply)` — the reply is one of the closed set
//!   of [`Reply`] shapes, and normalization turns it into the final
//!   `(status, headers, body)` response;
//! - bail out early with [`halt`](Context::halt) and the `?` operator — the
//!   [`Halt`] control value abandons the rest of the closure and is caught
//!   at the block boundary, never anywhere else. Code after a `halt(..)?`
//!   does not run.
//!
//! ```rust
//! use obi::{block, Context, Flow};
//!
//! let login = block(|ctx: &mut Context| -> Flow {
//!     if ctx.request().header("authorization").is_none() {
//!         ctx.halt(401)?;
//!     }
//!     ctx.headers_mut().set("x-frame-options", "DENY");
//!     Ok("welcome".into())
//! });
//! ```
//!
//! Blocks are synchronous: they mutate response state and decide a shape.
//! Endpoints that need to await belong in plain `async fn` handlers; the two
//! kinds register on the router interchangeably.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, kind, private};
use crate::headers::Headers;
use crate::request::Request;
use crate::response::{Body, Chunks, Response};
use crate::status::reason_phrase_or_panic;

// ── Flow and Halt ────────────────────────────────────────────────────────────

/// What a block returns: a reply shape, or a halt caught at the boundary.
pub type Flow<T = Reply> = Result<T, Halt>;

/// The control value carried by an early exit.
///
/// Constructed only through [`Context::halt`] and friends; it never escapes
/// the block boundary — surrounding middleware and the dispatcher see the
/// normalized response, not the halt.
#[derive(Debug)]
pub struct Halt {
    status: u16,
    body: String,
}

// ── Reply ────────────────────────────────────────────────────────────────────

/// The closed set of shapes a block may produce.
///
/// Normalization matches these exhaustively; there is no "other" case, so a
/// shape the protocol does not know about is unrepresentable rather than a
/// runtime surprise.
pub enum Reply {
    /// Body text; status and headers come from the context.
    Text(String),
    /// Streaming body, emitted chunk by chunk; status and headers come from
    /// the context.
    Stream(Chunks),
    /// Bare status; the body is the context body if one was set, else the
    /// status's reason phrase.
    Status(u16),
    /// Status and body.
    StatusText(u16, String),
    /// Status and streaming body.
    StatusStream(u16, Chunks),
    /// Status, extra headers (merged over the context's, these winning),
    /// and body.
    StatusHeadersText(u16, Headers, String),
    /// Status, extra headers, and streaming body.
    StatusHeadersStream(u16, Headers, Chunks),
}

impl Reply {
    /// A streaming reply from any chunk-yielding iterator.
    pub fn stream<I>(items: I) -> Self
    where
        I: IntoIterator + Send + 'static,
        I::IntoIter: Send + 'static,
        I::Item: Into<Bytes>,
    {
        Self::Stream(Box::new(items.into_iter().map(Into::into)))
    }

    /// A streaming reply with an explicit status.
    pub fn status_stream<I>(status: u16, items: I) -> Self
    where
        I: IntoIterator + Send + 'static,
        I::IntoIter: Send + 'static,
        I::Item: Into<Bytes>,
    {
        Self::StatusStream(status, Box::new(items.into_iter().map(Into::into)))
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<u16> for Reply {
    fn from(status: u16) -> Self {
        Self::Status(status)
    }
}

impl From<(u16, String)> for Reply {
    fn from((status, text): (u16, String)) -> Self {
        Self::StatusText(status, text)
    }
}

impl From<(u16, &str)> for Reply {
    fn from((status, text): (u16, &str)) -> Self {
        Self::StatusText(status, text.to_owned())
    }
}

impl From<(u16, Headers, String)> for Reply {
    fn from((status, headers, text): (u16, Headers, String)) -> Self {
        Self::StatusHeadersText(status, headers, text)
    }
}

impl From<(u16, Headers, &str)> for Reply {
    fn from((status, headers, text): (u16, Headers, &str)) -> Self {
        Self::StatusHeadersText(status, headers, text.to_owned())
    }
}

/// Lets a block whose every path halts (`|ctx| ctx.halt(401)`) type-check.
impl From<Infallible> for Reply {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

// ── Context ──────────────────────────────────────────────────────────────────

/// Per-invocation execution context for a block endpoint.
///
/// Owns the request and the accumulating response state. One context per
/// request; nothing here is shared, so concurrent requests never observe
/// each other's status, headers, or body.
pub struct Context {
    request: Request,
    status: u16,
    headers: Headers,
    body: Option<String>,
}

impl Context {
    pub(crate) fn new(request: Request) -> Self {
        Self { request, status: 200, headers: Headers::new(), body: None }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// The body set so far, if any. Consulted when the block finishes with a
    /// bare [`Reply::Status`].
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Abandons the rest of the block, answering with `status` and that
    /// status's reason phrase as the body.
    ///
    /// Use with `?`; everything after the `halt(..)?` statement is skipped.
    ///
    /// # Panics
    ///
    /// If `status` has no registered reason phrase — pass an explicit body
    /// via [`halt_with`](Context::halt_with) for non-standard codes.
    pub fn halt(&self, status: u16) -> Flow<Infallible> {
        Err(Halt { status, body: reason_phrase_or_panic(status).to_owned() })
    }

    /// Like [`halt`](Context::halt), with an explicit body.
    pub fn halt_with(&self, status: u16, body: impl Into<String>) -> Flow<Infallible> {
        Err(Halt { status, body: body.into() })
    }

    /// Sets the `Location` header and halts with `301 Moved Permanently`.
    pub fn redirect(&mut self, url: &str) -> Flow<Infallible> {
        self.redirect_with(url, 301)
    }

    /// Sets the `Location` header and halts with the given status; the body
    /// is that status's reason phrase (`302` → `"Found"`).
    pub fn redirect_with(&mut self, url: &str, status: u16) -> Flow<Infallible> {
        self.headers.set("Location", url);
        self.halt(status)
    }

    /// The inbound `Referer`, defaulting to `"/"` — for `redirect(back())`
    /// flows.
    pub fn back(&self) -> &str {
        self.request.header("referer").unwrap_or("/")
    }

    /// Serializes `value` eagerly and sets `Content-Type: application/json`.
    /// Returns the serialized text so it can finish the block as its body.
    ///
    /// # Panics
    ///
    /// If `value` cannot be serialized — a handler handing the codec an
    /// unserializable value is a bug, not a runtime condition.
    pub fn json<T: Serialize>(&mut self, value: &T) -> String {
        self.json_with(value, "application/json")
    }

    /// [`json`](Context::json) with a custom MIME type (e.g.
    /// `application/vnd.api+json`).
    pub fn json_with<T: Serialize>(&mut self, value: &T, mime: &str) -> String {
        self.headers.set("Content-Type", mime);
        serde_json::to_string(value).expect("value must serialize to JSON")
    }

    /// Streaming JSON array encoding: yields `"["`, then each item
    /// serialized with `","` separators, then `"]"` — one fragment at a
    /// time, items pulled and encoded only as the transport asks for them.
    /// Sets `Content-Type: application/json`.
    pub fn json_stream<I>(&mut self, items: I) -> Chunks
    where
        I: IntoIterator + Send + 'static,
        I::IntoIter: Send + 'static,
        I::Item: Serialize,
    {
        self.json_stream_with(items, "application/json")
    }

    /// [`json_stream`](Context::json_stream) with a custom MIME type.
    pub fn json_stream_with<I>(&mut self, items: I, mime: &str) -> Chunks
    where
        I: IntoIterator + Send + 'static,
        I::IntoIter: Send + 'static,
        I::Item: Serialize,
    {
        self.headers.set("Content-Type", mime);
        Box::new(JsonFragments { items: items.into_iter(), pending: None, state: FragmentState::Start })
    }

    /// Normalizes whatever the block produced — reply shape or halt — into
    /// the response triple. Exhaustive over [`Reply`]; the enum is the
    /// complete set of shapes, checked at compile time.
    pub(crate) fn finish(self, flow: Flow) -> Response {
        let Context { status, mut headers, body, .. } = self;

        match flow {
            // A halt carries its own status and already-resolved body; the
            // headers accumulated before the halt still apply.
            Err(Halt { status, body }) => Response::from_parts(status, headers, Body::full(body)),
            Ok(reply) => match reply {
                Reply::Text(text) => Response::from_parts(status, headers, Body::full(text)),
                Reply::Stream(chunks) => {
                    Response::from_parts(status, headers, Body::Stream(chunks))
                }
                Reply::Status(code) => {
                    let body = body.unwrap_or_else(|| reason_phrase_or_panic(code).to_owned());
                    Response::from_parts(code, headers, Body::full(body))
                }
                Reply::StatusText(code, text) => {
                    Response::from_parts(code, headers, Body::full(text))
                }
                Reply::StatusStream(code, chunks) => {
                    Response::from_parts(code, headers, Body::Stream(chunks))
                }
                Reply::StatusHeadersText(code, extra, text) => {
                    headers.merge(extra);
                    Response::from_parts(code, headers, Body::full(text))
                }
                Reply::StatusHeadersStream(code, extra, chunks) => {
                    headers.merge(extra);
                    Response::from_parts(code, headers, Body::Stream(chunks))
                }
            },
        }
    }
}

// ── Streaming JSON encoder ───────────────────────────────────────────────────

enum FragmentState {
    Start,
    Items { first: bool },
    Done,
}

/// Single-traversal fragment iterator over a lazily encoded JSON array.
struct JsonFragments<I> {
    items: I,
    /// An encoded item held back while its `","` separator goes out first.
    pending: Option<Bytes>,
    state: FragmentState,
}

impl<I> Iterator for JsonFragments<I>
where
    I: Iterator,
    I::Item: Serialize,
{
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }

        match self.state {
            FragmentState::Start => {
                self.state = FragmentState::Items { first: true };
                Some(Bytes::from_static(b"["))
            }
            FragmentState::Items { first } => match self.items.next() {
                Some(item) => {
                    let encoded = Bytes::from(
                        serde_json::to_string(&item).expect("stream item must serialize to JSON"),
                    );
                    if first {
                        self.state = FragmentState::Items { first: false };
                        Some(encoded)
                    } else {
                        self.pending = Some(encoded);
                        Some(Bytes::from_static(b","))
                    }
                }
                None => {
                    self.state = FragmentState::Done;
                    Some(Bytes::from_static(b"]"))
                }
            },
            FragmentState::Done => None,
        }
    }
}

// ── Block endpoints ──────────────────────────────────────────────────────────

/// Adapts a context closure into a [`Handler`] registrable on the router.
///
/// The closure runs once per request against a fresh [`Context`]; its
/// [`Flow`] result is normalized at this boundary. See the module docs for
/// the protocol.
pub fn block<F, R>(f: F) -> Block
where
    F: Fn(&mut Context) -> Flow<R> + Send + Sync + 'static,
    R: Into<Reply> + 'static,
{
    Block { f: Box::new(move |ctx| f(ctx).map(Into::into)) }
}

/// A block endpoint; build one with [`block`].
pub struct Block {
    f: Box<dyn Fn(&mut Context) -> Flow + Send + Sync>,
}

impl ErasedHandler for Block {
    fn call(&self, req: Request) -> BoxFuture {
        let mut ctx = Context::new(req);
        let flow = (self.f)(&mut ctx);
        let response = ctx.finish(flow);
        Box::pin(std::future::ready(response))
    }
}

impl private::Sealed<kind::Erased> for Block {}

impl Handler<kind::Erased> for Block {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}
