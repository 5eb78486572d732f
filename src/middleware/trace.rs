//! Built-in tracing middleware.
//!
//! Wraps every request in a span carrying the method and path, and emits a
//! completion event with the status and latency. Register it at the root
//! scope to cover the whole application:
//!
//! ```rust
//! use obi::{App, Router};
//! use obi::middleware::trace::Trace;
//!
//! let app = App::new(Router::new()).wrap(Trace).finalize();
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;
use crate::request::Request;

/// Per-request span with method, path, status, and latency.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn layer(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(TraceApp { next })
    }
}

struct TraceApp {
    next: BoxedHandler,
}

impl ErasedHandler for TraceApp {
    fn call(&self, req: Request) -> BoxFuture {
        let span = info_span!("request", method = %req.method(), path = %req.path());
        let next = Arc::clone(&self.next);

        Box::pin(
            async move {
                let started = Instant::now();
                let response = next.call(req).await;
                info!(
                    status = response.status(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request served"
                );
                response
            }
            .instrument(span),
        )
    }
}
