//! The handler capability.
//!
//! # Two origins, one shape
//!
//! A handler is anything that can be called with the response writer and the
//! request and returns nothing. It comes from one of two places:
//!
//! ```text
//! |res, req| { … }                   ← closure or fn item
//!        ↓ HandlerFunc::new
//! HandlerFunc(Arc<dyn Fn>)           ← cloneable, shared across requests
//!
//! struct Api;  impl Handler for Api  ← object with a `serve` method
//!        ↓ HandlerFunc::from_handler
//! HandlerFunc(Arc<dyn Fn>)           ← calls `api.serve(res, req)`
//! ```
//!
//! Every middleware consumes and produces a [`HandlerFunc`], so the chain is
//! stored uniformly no matter where each layer came from. Calling one costs
//! a single virtual call. Cloning one costs an atomic increment.

use std::fmt;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

/// An object that handles requests.
///
/// Implement this on your own types and pass them to
/// [`Builder::from_handler`](crate::Builder::from_handler):
///
/// ```rust
/// use strata::{Builder, Handler, Request, Response};
///
/// struct Greeter { name: String }
///
/// impl Handler for Greeter {
///     fn serve(&self, res: &mut Response, _req: &Request) {
///         res.write(format!("hello {}", self.name));
///     }
/// }
///
/// let app = Builder::from_handler(Greeter { name: "alice".into() }).build();
/// let mut res = Response::default();
/// app.call(&mut res, &Request::default());
/// assert_eq!(res.body(), b"hello alice");
/// ```
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, res: &mut Response, req: &Request);
}

/// A type-erased handler function shared across concurrent requests.
#[derive(Clone)]
pub struct HandlerFunc(Arc<dyn Fn(&mut Response, &Request) + Send + Sync + 'static>);

impl HandlerFunc {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Adapts a [`Handler`] object. Both arguments pass through unchanged.
    pub fn from_handler<H: Handler>(handler: H) -> Self {
        Self::new(move |res, req| handler.serve(res, req))
    }

    pub fn call(&self, res: &mut Response, req: &Request) {
        (self.0)(res, req)
    }

    /// True when both values point to the same underlying function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HandlerFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFunc").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Handler for Echo {
        fn serve(&self, res: &mut Response, req: &Request) {
            res.write(req.path());
        }
    }

    #[test]
    fn object_receives_both_arguments() {
        let h = HandlerFunc::from_handler(Echo);
        let req = Request::from(
            http::Request::builder().uri("/ping").body(bytes::Bytes::new()).unwrap(),
        );
        let mut res = Response::default();
        h.call(&mut res, &req);
        assert_eq!(res.body(), b"/ping");
    }

    #[test]
    fn clones_share_the_function() {
        let h = HandlerFunc::new(|res, _| res.write("x"));
        let c = h.clone();
        assert!(h.ptr_eq(&c));
        assert!(!h.ptr_eq(&HandlerFunc::new(|_, _| {})));
    }
}
