//! Block endpoints: halting, redirecting, response shapes, streaming.

use http::Method;
use obi::{Block, Context, Flow, Handler, Headers, Reply, Request, Router, block};

/// Runs a block endpoint against a request and splits the response into
/// status, headers, and the ordered list of body chunks as they would be
/// written to the wire.
async fn respond(endpoint: Block, req: Request) -> (u16, Headers, Vec<String>) {
    let handler = endpoint.into_boxed_handler();
    let (status, headers, body) = handler.call(req).await.into_parts();
    let chunks = body
        .into_chunks()
        .map(|chunk| String::from_utf8(chunk.to_vec()).unwrap())
        .collect();
    (status, headers, chunks)
}

fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

#[tokio::test]
async fn bare_status_answers_with_reason_phrase() {
    let endpoint = block(|_ctx: &mut Context| -> Flow { Ok(200u16.into()) });

    let (status, _, chunks) = respond(endpoint, get("/")).await;
    assert_eq!(status, 200);
    assert_eq!(chunks, ["OK"]);
}

#[tokio::test]
async fn halt_skips_the_rest_of_the_block() {
    let endpoint = block(|ctx: &mut Context| -> Flow {
        ctx.halt_with(401, "nope")?;
        ctx.headers_mut().set("X-Never", "1");
        Ok("unreachable".into())
    });

    let (status, headers, chunks) = respond(endpoint, get("/auth")).await;
    assert_eq!(status, 401);
    assert_eq!(chunks, ["nope"]);
    assert!(headers.is_empty(), "the statement after halt must not run");
}

#[tokio::test]
async fn headers_set_before_a_halt_survive() {
    let endpoint = block(|ctx: &mut Context| {
        ctx.headers_mut().set("x-request-id", "abc");
        ctx.halt(503)
    });

    let (status, headers, chunks) = respond(endpoint, get("/busy")).await;
    assert_eq!(status, 503);
    assert_eq!(chunks, ["Service Unavailable"]);
    assert_eq!(headers.get("x-request-id"), Some("abc"));
}

#[tokio::test]
async fn redirect_halts_with_location_and_reason_phrase() {
    let endpoint = block(|ctx: &mut Context| ctx.redirect("/x"));

    let (status, headers, chunks) = respond(endpoint, get("/legacy")).await;
    assert_eq!(status, 301);
    assert_eq!(headers.get("Location"), Some("/x"));
    assert_eq!(chunks, ["Moved Permanently"]);
}

#[tokio::test]
async fn redirect_back_follows_the_referer() {
    let endpoint = block(|ctx: &mut Context| {
        let target = ctx.back().to_owned();
        ctx.redirect_with(&target, 302)
    });

    let req = get("/form").with_header("Referer", "/previous");
    let (status, headers, chunks) = respond(endpoint, req).await;
    assert_eq!(status, 302);
    assert_eq!(headers.get("Location"), Some("/previous"));
    assert_eq!(chunks, ["Found"]);
}

#[tokio::test]
async fn context_state_flows_into_the_reply() {
    let endpoint = block(|ctx: &mut Context| -> Flow {
        ctx.set_status(201);
        ctx.headers_mut().set("X-Token", "abc");
        Ok("It was created".into())
    });

    let (status, headers, chunks) = respond(endpoint, get("/things")).await;
    assert_eq!(status, 201);
    assert_eq!(headers.get("X-Token"), Some("abc"));
    assert_eq!(chunks, ["It was created"]);
}

#[tokio::test]
async fn explicit_body_backs_a_bare_status() {
    let endpoint = block(|ctx: &mut Context| -> Flow {
        ctx.set_body("It was created");
        Ok(201u16.into())
    });

    let (status, _, chunks) = respond(endpoint, get("/things")).await;
    assert_eq!(status, 201);
    assert_eq!(chunks, ["It was created"]);
}

#[tokio::test]
async fn serialized_triple_shape() {
    let endpoint = block(|_ctx: &mut Context| -> Flow {
        let extra: Headers = [("X-Tea", "White butterfly")].into_iter().collect();
        Ok((418, extra, "I'm a teapot").into())
    });

    let (status, headers, chunks) = respond(endpoint, get("/tea")).await;
    assert_eq!(status, 418);
    assert_eq!(headers.get("X-Tea"), Some("White butterfly"));
    assert_eq!(chunks, ["I'm a teapot"]);
}

#[tokio::test]
async fn streamed_body_keeps_chunk_boundaries_and_order() {
    let endpoint = block(|_ctx: &mut Context| -> Flow { Ok(Reply::stream(["a", "b", "c"])) });

    let (status, _, chunks) = respond(endpoint, get("/stream")).await;
    assert_eq!(status, 200);
    assert_eq!(chunks, ["a", "b", "c"]);
}

#[tokio::test]
async fn streamed_json_emits_exact_fragments() {
    let endpoint = block(|ctx: &mut Context| -> Flow {
        let items = ctx.json_stream(vec!["a", "b", "c"]);
        Ok(Reply::Stream(items))
    });

    let (status, headers, chunks) = respond(endpoint, get("/stream/json")).await;
    assert_eq!(status, 200);
    assert_eq!(headers.get("Content-Type"), Some("application/json"));
    assert_eq!(chunks, ["[", "\"a\"", ",", "\"b\"", ",", "\"c\"", "]"]);
}

#[tokio::test]
async fn eager_json_finishes_as_text() {
    #[derive(serde::Serialize)]
    struct User {
        id: u32,
    }

    let endpoint = block(|ctx: &mut Context| -> Flow {
        let encoded = ctx.json(&vec![User { id: 23 }]);
        Ok(encoded.into())
    });

    let (status, headers, chunks) = respond(endpoint, get("/users")).await;
    assert_eq!(status, 200);
    assert_eq!(headers.get("Content-Type"), Some("application/json"));
    assert_eq!(chunks, ["[{\"id\":23}]"]);
}

#[tokio::test]
async fn blocks_and_async_handlers_share_the_router() {
    let router = Router::new()
        .on(Method::GET, "/plain", |_req: Request| async { "plain" })
        .on(
            Method::GET,
            "/users/{id}",
            block(|ctx: &mut Context| -> Flow {
                let id = ctx.request().param("id").unwrap_or("?").to_owned();
                Ok(format!("user {id}").into())
            }),
        );

    let handler = router.into_boxed_handler();

    let response = handler.call(get("/users/42")).await;
    assert_eq!(response.into_parts().2.collect(), "user 42");

    let response = handler.call(get("/plain")).await;
    assert_eq!(response.into_parts().2.collect(), "plain");
}
