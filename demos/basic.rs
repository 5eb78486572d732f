//! Minimal obi example — scoped middleware, block endpoints, streaming JSON.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users
//!   curl -i http://localhost:3000/legacy
//!   curl -i http://localhost:3000/admin
//!   curl -i -H 'authorization: Bearer t' http://localhost:3000/admin

use http::Method;
use obi::middleware::trace::Trace;
use obi::middleware::{Next, from_fn};
use obi::{App, Context, Flow, Reply, Request, Response, Router, Server, block};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = Router::new()
        .on(Method::GET, "/users/{id}", get_user)
        .on(Method::GET, "/users", block(list_users))
        .on(Method::GET, "/legacy", block(|ctx: &mut Context| ctx.redirect("/users")))
        .on(
            Method::GET,
            "/admin",
            block(|_ctx: &mut Context| -> Flow { Ok("admin area".into()) }),
        )
        .on(Method::GET, "/healthz", |_req: Request| async { "ok" });

    let require_token = from_fn(|req: Request, next: Next| async move {
        if req.header("authorization").is_none() {
            return Response::empty(401);
        }
        next.run(req).await
    });

    let app = App::new(router)
        .wrap(Trace)
        .scope("/admin", |admin| {
            admin.wrap(require_token);
        })
        .finalize();

    Server::bind("0.0.0.0:3000").serve(app).await.expect("server error");
}

// GET /users/{id}
//
// Response::json takes bytes — pass them from your serialiser:
//   serde_json:  Response::json(serde_json::to_vec(&user).unwrap())
//   hand-built:  Response::json(format!(...).into_bytes())
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// GET /users → a JSON array streamed element by element; with many rows the
// first byte leaves before the last row is even encoded.
fn list_users(ctx: &mut Context) -> Flow {
    let users = ctx.json_stream(vec!["alice", "bob", "carol"]);
    Ok(Reply::Stream(users))
}
