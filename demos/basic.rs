//! Minimal strata example: one handler, a CORS layer, and a timing layer.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'

use std::time::Instant;

use http::{HeaderValue, StatusCode};
use strata::middleware::cors::CorsConfig;
use strata::middleware::run_before;
use strata::{Builder, HandlerFunc, Request, Response, Server};

const CORS: &str = r#"{"allowOrigins":["http://localhost:8080"],"allowMethods":["GET","POST"]}"#;

#[tokio::main]
async fn main() -> Result<(), strata::Error> {
    tracing_subscriber::fmt::init();

    let app = Builder::from_fn(users)
        .with(timing)
        .with(CorsConfig::from_json(CORS)?.into_middleware())
        .with(run_before(|res: &mut Response, _: &Request| {
            res.set_header("x-powered-by", HeaderValue::from_static("strata"));
        }))
        .build();

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// Outermost layer: wraps the whole chain, so it needs `next` directly
// rather than a before/after adapter.
fn timing(next: HandlerFunc) -> HandlerFunc {
    HandlerFunc::new(move |res, req| {
        let start = Instant::now();
        next.call(res, req);
        tracing::info!(path = req.path(), elapsed = ?start.elapsed(), "handled");
    })
}

// GET /users/:id, POST /users
fn users(res: &mut Response, req: &Request) {
    match req.method() {
        &http::Method::GET => {
            let id = req.path().rsplit('/').next().unwrap_or("unknown");
            res.set_header("content-type", HeaderValue::from_static("application/json"));
            res.write(format!(r#"{{"id":"{id}","name":"alice"}}"#));
        }
        &http::Method::POST if !req.body().is_empty() => {
            res.set_status(StatusCode::CREATED);
            res.set_header("location", HeaderValue::from_static("/users/99"));
        }
        _ => res.set_status(StatusCode::BAD_REQUEST),
    }
}
