//! Application assembly: scopes, middleware registration, finalize.
//!
//! Declaration is plain builder code, single-threaded, run once at startup:
//!
//! ```rust
//! use obi::middleware::trace::Trace;
//! use obi::{App, Router, block, Context, Flow};
//! use http::Method;
//!
//! let router = Router::new().on(Method::GET, "/", block(|_ctx: &mut Context| -> Flow {
//!     Ok("hello".into())
//! }));
//!
//! let app = App::new(router)
//!     .wrap(Trace)
//!     .scope("/admin", |admin| {
//!         // admin.wrap(auth_middleware);
//!         admin.scope("audit", |audit| {
//!             // audit.wrap(audit_middleware);
//!         });
//!     })
//!     .finalize();
//! ```
//!
//! [`App::finalize`] consumes the builder, composes one middleware chain per
//! registered scope prefix (ancestors accumulated, duplicates dropped), and
//! returns the immutable application the server shares across connections.
//! After that point no registration method exists to call: the build phase
//! and the serving phase are different types.

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{Middleware, Stack};

// ── App ──────────────────────────────────────────────────────────────────────

/// Builder tying a base handler to a scoped middleware stack.
pub struct App {
    base: BoxedHandler,
    stack: Stack,
}

impl App {
    /// Starts an application around a base handler — typically a
    /// [`Router`](crate::Router), but any [`Handler`] works.
    pub fn new<K>(base: impl Handler<K>) -> Self {
        Self { base: base.into_boxed_handler(), stack: Stack::new() }
    }

    /// Registers `middleware` under the root scope: it runs for every
    /// request, whatever the path.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(middleware);
        self
    }

    /// Declares a scope under `prefix` and runs `declare` inside it.
    ///
    /// Middleware registered within applies to every path at or below the
    /// prefix. Scopes nest; a nested prefix is relative to its parent.
    /// Prefixes are canonicalized, so `"admin"`, `"/admin"` and `"/admin/"`
    /// declare the same scope.
    pub fn scope(mut self, prefix: &str, declare: impl FnOnce(&mut Scope)) -> Self {
        self.stack.scoped(prefix, |stack| declare(&mut Scope { stack }));
        self
    }

    /// The one-time build step: composes every scope's chain and freezes
    /// the result. With no middleware registered this returns the base
    /// handler itself — zero dispatch overhead for plain routing.
    pub fn finalize(self) -> BoxedHandler {
        self.stack.finalize(self.base)
    }
}

// ── Scope ────────────────────────────────────────────────────────────────────

/// A scope under declaration; see [`App::scope`].
pub struct Scope<'a> {
    stack: &'a mut Stack,
}

impl Scope<'_> {
    /// Registers `middleware` under this scope's prefix.
    pub fn wrap(&mut self, middleware: impl Middleware) -> &mut Self {
        self.stack.push(middleware);
        self
    }

    /// Declares a nested scope relative to this one.
    pub fn scope(&mut self, prefix: &str, declare: impl FnOnce(&mut Scope)) -> &mut Self {
        self.stack.scoped(prefix, |stack| declare(&mut Scope { stack }));
        self
    }
}
