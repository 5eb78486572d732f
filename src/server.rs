//! HTTP server and graceful shutdown.
//!
//! The server is deliberately thin: accept connections, hand each request to
//! the finalized application, write the `(status, headers, body)` triple
//! back out. Buffered bodies go out with a `content-length`; streaming
//! bodies are handed to hyper chunk by chunk, with an await point between
//! chunks so a slow stream never starves other connections.
//!
//! # Graceful shutdown
//!
//! On SIGTERM (what Kubernetes and `kill` send) or Ctrl-C the server stops
//! accepting new connections immediately, lets every in-flight connection
//! task run to completion, and then returns from [`Server::serve`].

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use futures_util::stream;
use http::StatusCode;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::{Body, Response};

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `app` — the
    /// value returned by [`App::finalize`](crate::App::finalize).
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, app: BoxedHandler) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, "obi listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` makes select! check arms top-to-bottom. Shutdown
                // is checked first so a SIGTERM stops accepting immediately,
                // even with connections queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = BoxedHandler::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // The closure is called once per request on the
                        // connection, not once per connection.
                        let svc = service_fn(move |req| {
                            let app = BoxedHandler::clone(&app);
                            async move { dispatch(app, req).await }
                        });

                        // `auto::Builder` handles both HTTP/1.1 and HTTP/2,
                        // whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not
                // grow without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection before returning.
        while tasks.join_next().await.is_some() {}

        info!("obi stopped");
        Ok(())
    }
}

// ── Request dispatch ─────────────────────────────────────────────────────────

type ServeBody = UnsyncBoxBody<Bytes, Infallible>;

/// Core hot path: one request through the application, one response out.
///
/// The error type is [`Infallible`] — failures are expressed as HTTP
/// responses, so hyper never sees an error from us.
async fn dispatch(
    app: BoxedHandler,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<ServeBody>, Infallible> {
    let (parts, incoming) = req.into_parts();

    let body = match incoming.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("failed to read request body: {e}");
            return Ok(encode(Response::empty(400)));
        }
    };

    let mut request = Request::new(parts.method, parts.uri.path().to_owned()).with_body(body);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    Ok(encode(app.call(request).await))
}

/// Converts the framework response triple into hyper's representation.
fn encode(response: Response) -> http::Response<ServeBody> {
    let (status, headers, body) = response.into_parts();

    let status = StatusCode::from_u16(status).unwrap_or_else(|_| {
        error!(status, "handler produced an out-of-range status code");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = http::Response::builder().status(status);
    for (name, value) in headers.iter() {
        builder = builder.header(name, value);
    }

    let body = match body {
        // Exact size known: hyper emits a content-length.
        Body::Full(bytes) => Full::new(bytes).boxed_unsync(),
        // Unknown size: hyper falls back to chunked transfer and writes one
        // frame per pulled chunk.
        Body::Stream(chunks) => {
            StreamBody::new(stream::iter(chunks.map(|c| Ok::<_, Infallible>(Frame::data(c)))))
                .boxed_unsync()
        }
    };

    builder.body(body).unwrap_or_else(|e| {
        error!("failed to encode response: {e}");
        http::Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::new(Bytes::new()).boxed_unsync())
            .expect("empty 500 response must build")
    })
}

// ── Shutdown signal ──────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both SIGTERM and SIGINT (Ctrl-C, for local
/// dev). On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
