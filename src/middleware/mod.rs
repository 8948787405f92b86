//! Middleware layer.
//!
//! A middleware receives the next handler in the chain and returns a new
//! handler that decides if, when, and how often to call it. That is the
//! whole abstraction: one function from [`HandlerFunc`] to [`HandlerFunc`].
//!
//! Most cross-cutting concerns do not need to decide anything. They only
//! want to run some code before or after the rest of the chain. Lift such a
//! plain handler into a middleware with [`run_before`] or [`run_after`]
//! instead of writing the `next.call(res, req)` plumbing by hand:
//!
//! ```rust
//! use strata::middleware::{run_after, run_before};
//! use strata::{Builder, Request, Response};
//!
//! let app = Builder::from_fn(|res, _req| res.write("body"))
//!     .with(run_before(|res, _req| res.write("<")))
//!     .with(run_after(|res, _req| res.write(">")))
//!     .build();
//!
//! let mut res = Response::default();
//! app.call(&mut res, &Request::default());
//! assert_eq!(res.body(), b"<body>");
//! ```
//!
//! Built-in middleware:
//! - [`cors`] sets the four `Access-Control-Allow-*` response headers

use std::sync::Arc;

use crate::handler::HandlerFunc;
use crate::request::Request;
use crate::response::Response;

pub mod cors;

/// A transformation from one handler to another.
///
/// Implemented for every `Fn(HandlerFunc) -> HandlerFunc`, so a closure is
/// usually all you need:
///
/// ```rust
/// use http::StatusCode;
/// use strata::{HandlerFunc, Middleware};
///
/// fn require_auth() -> impl Middleware {
///     |next: HandlerFunc| {
///         HandlerFunc::new(move |res, req| {
///             if req.header("authorization").is_none() {
///                 res.set_status(StatusCode::UNAUTHORIZED);
///                 return;
///             }
///             next.call(res, req);
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: HandlerFunc) -> HandlerFunc;
}

impl<F> Middleware for F
where
    F: Fn(HandlerFunc) -> HandlerFunc + Send + Sync + 'static,
{
    fn wrap(&self, next: HandlerFunc) -> HandlerFunc {
        self(next)
    }
}

/// Runs `side_effect`, then the rest of the chain.
pub fn run_before<F>(side_effect: F) -> impl Middleware
where
    F: Fn(&mut Response, &Request) + Send + Sync + 'static,
{
    let side_effect = Arc::new(side_effect);
    move |next: HandlerFunc| {
        let side_effect = Arc::clone(&side_effect);
        HandlerFunc::new(move |res, req| {
            side_effect(res, req);
            next.call(res, req);
        })
    }
}

/// Runs the rest of the chain, then `side_effect`.
///
/// Use this for trailing behavior that is only valid once everything
/// downstream has run.
pub fn run_after<F>(side_effect: F) -> impl Middleware
where
    F: Fn(&mut Response, &Request) + Send + Sync + 'static,
{
    let side_effect = Arc::new(side_effect);
    move |next: HandlerFunc| {
        let side_effect = Arc::clone(&side_effect);
        HandlerFunc::new(move |res, req| {
            next.call(res, req);
            side_effect(res, req);
        })
    }
}
