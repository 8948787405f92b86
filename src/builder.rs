//! Middleware chain builder.
//!
//! Layers compose like an onion. The first middleware attached is the
//! outermost layer: it sees the request first and gets the last word on the
//! response. For middlewares `[m0, m1, …, mn]` and terminal handler `h`:
//!
//! ```text
//! build()  ==  m0(m1(…mn(h)…))
//!
//! request  ──▶ m0 ──▶ m1 ──▶ … ──▶ mn ──▶ h
//! response ◀── m0 ◀── m1 ◀── … ◀── mn ◀──┘
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::handler::{Handler, HandlerFunc};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Accumulates middlewares around one terminal handler.
///
/// Each [`Builder::with`] call returns `self`, so attachments chain
/// naturally. [`Builder::build`] only reads the builder; building twice
/// yields two handlers that behave identically.
///
/// ```rust
/// use strata::middleware::run_before;
/// use strata::{Builder, Request, Response};
///
/// let app = Builder::from_fn(|res, _req| res.write("2"))
///     .with(run_before(|res, _req| res.write("0 - ")))
///     .with(run_before(|res, _req| res.write("1 - ")))
///     .build();
///
/// let mut res = Response::default();
/// app.call(&mut res, &Request::default());
/// assert_eq!(res.body(), b"0 - 1 - 2");
/// ```
#[derive(Clone)]
pub struct Builder {
    middlewares: Vec<Arc<dyn Middleware>>,
    handler: HandlerFunc,
}

impl Builder {
    /// Starts a chain whose terminal handler is a function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        Self::new(HandlerFunc::new(f))
    }

    /// Starts a chain whose terminal handler is a [`Handler`] object.
    pub fn from_handler<H: Handler>(handler: H) -> Self {
        Self::new(HandlerFunc::from_handler(handler))
    }

    /// Starts a chain around an already type-erased handler.
    pub fn new(handler: HandlerFunc) -> Self {
        Self { middlewares: Vec::new(), handler }
    }

    /// Attaches `middleware` inside every middleware attached so far.
    /// Returns `self` for chaining.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.attach(middleware);
        self
    }

    /// Same as [`with`](Self::with), through a mutable reference.
    pub fn attach(&mut self, middleware: impl Middleware) -> &mut Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Number of middlewares attached so far.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// True when `build` would return the terminal handler unchanged.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Composes the chain into one handler.
    ///
    /// Folds from the last-attached middleware to the first, so the first
    /// attached ends up outermost. With no middlewares this is the terminal
    /// handler itself.
    pub fn build(&self) -> HandlerFunc {
        debug!(middlewares = self.middlewares.len(), "composing handler chain");
        self.middlewares
            .iter()
            .rev()
            .fold(self.handler.clone(), |next, m| m.wrap(next))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::middleware::{run_after, run_before};

    fn invoke(h: &HandlerFunc) -> String {
        let mut res = Response::default();
        h.call(&mut res, &Request::default());
        String::from_utf8(res.body().to_vec()).unwrap()
    }

    fn write(s: &'static str) -> impl Fn(&mut Response, &Request) + Send + Sync + 'static {
        move |res: &mut Response, _: &Request| res.write(s)
    }

    struct Empty;

    impl Handler for Empty {
        fn serve(&self, _res: &mut Response, _req: &Request) {}
    }

    #[test]
    fn empty_chain_is_the_terminal_handler() {
        let terminal = HandlerFunc::new(write("h"));
        let builder = Builder::new(terminal.clone());
        assert!(builder.is_empty());
        assert!(builder.build().ptr_eq(&terminal));
    }

    #[test]
    fn raw_middleware_before_next() {
        let app = Builder::from_fn(|_, _| {})
            .with(|next: HandlerFunc| {
                HandlerFunc::new(move |res, req| {
                    res.write("something");
                    next.call(res, req);
                })
            })
            .build();
        assert_eq!(invoke(&app), "something");
    }

    #[test]
    fn raw_middlewares_before_and_after() {
        let app = Builder::from_handler(Empty)
            .with(|next: HandlerFunc| {
                HandlerFunc::new(move |res, req| {
                    res.write("something");
                    next.call(res, req);
                })
            })
            .with(|next: HandlerFunc| {
                HandlerFunc::new(move |res, req| {
                    next.call(res, req);
                    res.write(" else");
                })
            })
            .build();
        assert_eq!(invoke(&app), "something else");
    }

    #[test]
    fn before_adapters_run_in_attachment_order() {
        let app = Builder::from_fn(write("2"))
            .with(run_before(write("0 - ")))
            .with(run_before(write("1 - ")))
            .build();
        assert_eq!(invoke(&app), "0 - 1 - 2");
    }

    #[test]
    fn after_adapters_unwind_in_reverse_order() {
        let app = Builder::from_fn(write("1"))
            .with(run_after(write(" - 3")))
            .with(run_after(write(" - 2")))
            .build();
        assert_eq!(invoke(&app), "1 - 2 - 3");
    }

    #[test]
    fn onion_order_with_mixed_adapters() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let step = |name: &'static str| {
            let trace = Arc::clone(&trace);
            move |_: &mut Response, _: &Request| trace.lock().unwrap().push(name)
        };

        let mut builder = Builder::from_fn(step("h"));
        for (before, after) in [("b0", "a0"), ("b1", "a1"), ("b2", "a2")] {
            builder
                .attach(run_before(step(before)))
                .attach(run_after(step(after)));
        }
        builder.build().call(&mut Response::default(), &Request::default());

        assert_eq!(
            *trace.lock().unwrap(),
            ["b0", "b1", "b2", "h", "a2", "a1", "a0"],
        );
    }

    #[test]
    fn handler_object_matches_function() {
        let from_handler = Builder::from_handler(Empty).with(run_before(write("x"))).build();
        let from_fn = Builder::from_fn(|_, _| {}).with(run_before(write("x"))).build();
        assert_eq!(invoke(&from_handler), invoke(&from_fn));
    }

    #[test]
    fn build_twice_is_idempotent() {
        let builder = Builder::from_fn(write("h"))
            .with(run_before(write("<")))
            .with(run_after(write(">")));
        let first = builder.build();
        let second = builder.build();
        assert_eq!(invoke(&first), "<h>");
        assert_eq!(invoke(&second), "<h>");
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn build_reflects_later_attachments() {
        let mut builder = Builder::from_fn(write("h"));
        let before = builder.build();
        builder.attach(run_before(write("+")));
        assert_eq!(invoke(&before), "h");
        assert_eq!(invoke(&builder.build()), "+h");
    }
}
