//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, request-id injection,
//! rate-limit headers, authentication-header inspection.
//!
//! A middleware is a decorator factory: given the next application in the
//! chain it returns a new application wrapping it. Chains are composed once,
//! per scope prefix, when the [`App`](crate::App) is finalized — never per
//! request. At request time the dispatcher picks the chain registered for
//! the longest matching prefix and invokes it; the wrappers run outermost
//! scope first on the way in, innermost last before the base handler.
//!
//! Two ways to write one:
//!
//! - implement [`Middleware`] on a struct (full control, override
//!   [`dedup_key`](Middleware::dedup_key) when the struct carries
//!   configuration that should participate in deduplication), or
//! - wrap an async closure with [`from_fn`] for the common
//!   inspect-then-delegate case.

mod dispatch;
mod stack;
mod trie;

pub mod trace;

pub(crate) use stack::Stack;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

// ── Middleware trait ─────────────────────────────────────────────────────────

/// A decorator over a downstream application.
///
/// `layer` is invoked at build time, once per scope prefix the middleware
/// participates in; the returned application is what serves requests.
pub trait Middleware: Send + Sync + 'static {
    /// Wraps `next`, returning the decorated application.
    fn layer(&self, next: BoxedHandler) -> BoxedHandler;

    /// Structural identity used for deduplication within a resolved chain.
    ///
    /// Two registrations with the same key collapse into one execution, the
    /// first occurrence winning. The default — the concrete type name — is
    /// right for stateless middleware; middleware constructed with arguments
    /// should fold those arguments into the key so that, say, two
    /// `SetHeader` registrations with different headers both survive.
    fn dedup_key(&self) -> String {
        std::any::type_name::<Self>().to_owned()
    }
}

// ── from_fn ──────────────────────────────────────────────────────────────────

/// The rest of the chain, handed to a [`from_fn`] middleware.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    /// Delegates to the downstream application.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Builds a middleware from an async closure.
///
/// ```rust
/// use obi::middleware::{from_fn, Next};
/// use obi::Request;
///
/// let tagged = from_fn(|req: Request, next: Next| async move {
///     let mut response = next.run(req).await;
///     response.headers_mut().set("x-served-by", "obi");
///     response
/// });
/// ```
///
/// The closure's type is its dedup key, so registering the same `from_fn`
/// value under an ancestor and a descendant scope still runs it once.
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FromFn { f }
}

/// Middleware adapter returned by [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn layer(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(FromFnApp { f: self.f.clone(), next })
    }
}

struct FromFnApp<F> {
    f: F,
    next: BoxedHandler,
}

impl<F, Fut> ErasedHandler for FromFnApp<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { inner: Arc::clone(&self.next) };
        Box::pin((self.f)(req, next))
    }
}
