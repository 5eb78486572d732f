//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. The router is the base
//! application the middleware stack wraps: it owns URL pattern matching and
//! path-parameter extraction, and everything upstream of it only ever sees
//! "a request came in, an application answered". An unmatched request
//! answers `404` with no body.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, kind, private};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; hand it to [`App::new`](crate::App::new) (or
/// straight to [`Server::serve`](crate::Server::serve) via
/// `App::new(router).finalize()` when no middleware is involved). Each
/// [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for
    /// chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them:
    ///
    /// ```rust,no_run
    /// # use obi::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting route pattern; route tables are
    /// static program structure, and a bad one should fail at startup.
    pub fn on<K>(mut self, method: Method, path: &str, handler: impl Handler<K>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl ErasedHandler for Router {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(req)
            }
            None => Box::pin(std::future::ready(Response::empty(404))),
        }
    }
}

impl private::Sealed<kind::Erased> for Router {}

impl Handler<kind::Erased> for Router {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn call(router: &Router, method: Method, path: &str) -> Response {
        router.call(Request::new(method, path)).await
    }

    #[tokio::test]
    async fn routes_by_method_and_path() {
        let router = Router::new()
            .on(Method::GET, "/users/{id}", |req: Request| async move {
                Response::text(format!("user {}", req.param("id").unwrap_or("?")))
            })
            .on(Method::DELETE, "/users/{id}", |_req: Request| async { 204u16 });

        let response = call(&router, Method::GET, "/users/42").await;
        assert_eq!(response.into_parts().2.collect(), "user 42");

        let response = call(&router, Method::DELETE, "/users/42").await;
        assert_eq!(response.status(), 204);
    }

    #[tokio::test]
    async fn unmatched_requests_answer_404() {
        let router = Router::new().on(Method::GET, "/", |_req: Request| async { "home" });

        assert_eq!(call(&router, Method::GET, "/missing").await.status(), 404);
        assert_eq!(call(&router, Method::POST, "/").await.status(), 404);
    }
}
