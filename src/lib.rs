//! # strata
//!
//! Onion-style middleware composition for HTTP handlers. Nothing more.
//! Nothing less.
//!
//! ## The contract
//!
//! A handler receives the response writer and the request and returns
//! nothing. A middleware turns one handler into another. A [`Builder`] holds a
//! terminal handler plus an ordered list of middlewares and composes them
//! into a single handler, first-attached outermost.
//!
//! What strata leaves to the host runtime:
//!
//! - **Routing**: mount one built handler per route in whatever router you use
//! - **Connection handling and TLS**: hyper, nginx, your ingress
//! - **Request parsing**: the runtime hands over a ready [`Request`]
//!
//! What's left for strata:
//!
//! - Composition with predictable ordering ([`Builder`], [`Middleware`])
//! - Before/after adapters that lift plain handlers into middleware
//!   ([`middleware::run_before`], [`middleware::run_after`])
//! - A configurable CORS layer ([`middleware::cors`])
//! - A thin hyper host for serving a built handler ([`Server`])
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strata::middleware::{cors::cors, run_after};
//! use strata::{Builder, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strata::Error> {
//!     let app = Builder::from_fn(hello)
//!         .with(cors(|c| c.allow_methods = ["GET", "POST"].into()))
//!         .with(run_after(|res, _req| res.write("\n")))
//!         .build();
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! fn hello(res: &mut Response, req: &Request) {
//!     res.write(format!("hello from {}", req.path()));
//! }
//! ```

mod builder;
mod error;
mod handler;
mod header;
mod request;
mod response;
mod server;

pub mod middleware;

pub use builder::Builder;
pub use error::Error;
pub use handler::{Handler, HandlerFunc};
pub use header::{HeaderList, WILDCARD};
pub use middleware::Middleware;
pub use request::Request;
pub use response::Response;
pub use server::Server;
