//! # obi
//!
//! Scoped middleware and block-style handlers for minimal HTTP services.
//! obi is the sash, not the robe: it composes what wraps your handlers and
//! stays out of everything else.
//!
//! ## The contract
//!
//! URL pattern matching belongs to the radix-tree router ([`matchit`]), the
//! wire belongs to hyper, JSON encoding belongs to serde. What's left — the
//! part that actually differs between applications — is how cross-cutting
//! behavior is layered over routes, and that is all obi does:
//!
//! - **Scoped middleware** — declare middleware per path prefix; nested
//!   scopes inherit their ancestors' chains, composed once at startup and
//!   selected per request by longest registered prefix.
//! - **Block endpoints** — a per-request execution context with `halt`,
//!   `redirect`, and `json` helpers, normalizing a closed set of return
//!   shapes into `(status, headers, body)`.
//! - **Streaming bodies** — a body may be a lazy chunk iterator, written
//!   out one item at a time for chunked transfer.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use obi::middleware::trace::Trace;
//! use obi::{App, Context, Request, Response, Router, Server, block};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .on(Method::GET, "/users/{id}", get_user)
//!         .on(Method::GET, "/legacy", block(|ctx: &mut Context| {
//!             ctx.redirect("/users/1")
//!         }));
//!
//!     let app = App::new(router)
//!         .wrap(Trace)
//!         .scope("/admin", |admin| {
//!             // admin.wrap(require_auth);
//!         })
//!         .finalize();
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     // obi sends bytes — serialize however you like:
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```
//!
//! Declaration (scopes, registrations, `finalize`) happens once, on one
//! thread, at startup. Serving happens on the immutable result, shared
//! lock-free across every connection.

mod app;
mod context;
mod error;
mod handler;
mod headers;
mod path;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod middleware;

pub use app::{App, Scope};
pub use context::{Block, Context, Flow, Halt, Reply, block};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, kind};
pub use headers::Headers;
pub use request::Request;
pub use response::{Body, Chunks, ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use status::reason_phrase;
