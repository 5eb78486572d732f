//! Handler trait and type erasure.
//!
//! Everything that can answer a request — an `async fn` endpoint, the
//! router, a block endpoint, a finalized middleware chain — is stored and
//! invoked through one uniform shape: [`BoxedHandler`], an
//! `Arc<dyn ErasedHandler>`. Middleware composes by capturing the next
//! `BoxedHandler` at build time and delegating to it at call time, so a
//! whole chain is itself just another handler.
//!
//! The chain from user code to vtable call:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓ stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//! ```
//!
//! The per-request cost is one `Arc` clone plus one virtual call —
//! negligible next to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Erased types ─────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` because the runtime polls the future in place; `Send` so
/// tokio may move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// The uniform dispatch interface: one request in, one response future out.
///
/// Implemented by the router, by block endpoints, by finalized middleware
/// chains, and by the wrapper applications middleware builds around their
/// `next`. Implement it directly when writing middleware by hand; for plain
/// endpoints the [`Handler`] blanket impl does it for you.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased application shared across concurrent
/// requests.
///
/// `Arc` gives cheap, thread-safe shared ownership: one atomic increment per
/// request, no copying.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ─────────────────────────────────────────────────────

/// Implemented for every value the framework accepts as an endpoint.
///
/// Satisfied by any `async fn(Request) -> impl IntoResponse`, by
/// [`Router`](crate::Router), and by [`block`](crate::block) endpoints.
/// The trait is sealed: the impls in this crate are the complete set, which
/// keeps the API surface stable across versions.
///
/// `Kind` is an inference-only marker keeping the function blanket impl and
/// the concrete impls from colliding; registration sites are generic over
/// it and you never name it.
pub trait Handler<Kind = kind::Erased>: private::Sealed<Kind> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Marker types telling the [`Handler`] impls apart. Never named in
/// application code; inference picks the right one at the registration
/// site.
pub mod kind {
    /// Plain `async fn(Request) -> impl IntoResponse` handlers.
    pub enum Fn {}
    /// Types implementing [`ErasedHandler`](super::ErasedHandler) directly.
    pub enum Erased {}
}

/// The sealing module. `Sealed` is private, so external crates cannot name
/// it and therefore cannot implement `Handler` on their own types.
pub(crate) mod private {
    pub trait Sealed<Kind> {}
}

// ── Blanket implementations ──────────────────────────────────────────────────

/// `Fn(Request) -> Fut` covers named `async fn` items, `async` closures, and
/// any struct implementing `Fn`.
impl<F, Fut, R> private::Sealed<kind::Fn> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler<kind::Fn> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ─────────────────────────────────────────────────────────

/// Newtype holding a concrete handler `F`, bridging the typed world to the
/// trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
