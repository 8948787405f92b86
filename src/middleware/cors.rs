//! CORS (Cross-Origin Resource Sharing) middleware.
//!
//! Sets four response headers on every request that passes through it:
//!
//! | Header | Field | Document key |
//! |---|---|---|
//! | `Access-Control-Allow-Origin` | `allow_origins` | `allowOrigins` |
//! | `Access-Control-Allow-Headers` | `allow_headers` | `allowHeaders` |
//! | `Access-Control-Allow-Methods` | `allow_methods` | `allowMethods` |
//! | `Access-Control-Allow-Credentials` | `allow_credentials` | `allowCredentials` |
//!
//! Every field defaults to `*`. An explicitly empty list is sent as an empty
//! header value, never replaced by the default.
//!
//! ```rust
//! use strata::middleware::cors::cors;
//! use strata::{Builder, Request, Response};
//!
//! let app = Builder::from_fn(|_res, _req| {})
//!     .with(cors(|c| c.allow_methods = ["GET", "POST"].into()))
//!     .build();
//!
//! let mut res = Response::default();
//! app.call(&mut res, &Request::default());
//! assert_eq!(res.header("access-control-allow-methods"), Some("GET, POST"));
//! assert_eq!(res.header("access-control-allow-origin"), Some("*"));
//! ```
//!
//! The config can also be decoded from a document and handed over whole:
//!
//! ```rust
//! use strata::middleware::cors::CorsConfig;
//!
//! let config = CorsConfig::from_json(r#"{"allowOrigins":["my-site.com"]}"#)?;
//! let middleware = config.into_middleware();
//! # Ok::<(), strata::Error>(())
//! ```

use std::sync::Arc;

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Middleware, run_before};
use crate::error::Error;
use crate::handler::HandlerFunc;
use crate::header::HeaderList;

/// The four CORS header lists.
///
/// `Default` sets every field to `["*"]`. When decoding, fields missing from
/// the document keep that default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsConfig {
    pub allow_origins: HeaderList,
    pub allow_headers: HeaderList,
    pub allow_methods: HeaderList,
    pub allow_credentials: HeaderList,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: HeaderList::wildcard(),
            allow_headers: HeaderList::wildcard(),
            allow_methods: HeaderList::wildcard(),
            allow_credentials: HeaderList::wildcard(),
        }
    }
}

impl CorsConfig {
    /// Decodes a JSON document such as
    /// `{"allowOrigins":["my-site.com"],"allowMethods":["GET","POST"]}`.
    pub fn from_json(document: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(document)?)
    }

    /// Decodes a YAML document with the same keys as [`from_json`](Self::from_json).
    pub fn from_yaml(document: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(document)?)
    }

    /// Freezes the config into a middleware.
    ///
    /// Header values are rendered once, here, and reused for every request.
    /// A value that is not a legal header value is logged and left unset.
    pub fn into_middleware(self) -> Cors {
        let headers: Vec<(HeaderName, HeaderValue)> = [
            (ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origins),
            (ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers),
            (ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods),
            (ACCESS_CONTROL_ALLOW_CREDENTIALS, &self.allow_credentials),
        ]
        .into_iter()
        .filter_map(|(name, list)| {
            let rendered = list.to_header_value();
            match HeaderValue::from_str(&rendered) {
                Ok(value) => Some((name, value)),
                Err(e) => {
                    warn!(header = %name, value = ?rendered, "skipping invalid cors header: {e}");
                    None
                }
            }
        })
        .collect();

        debug!(?headers, "cors middleware configured");

        Cors { headers: headers.into() }
    }
}

/// Builds a CORS middleware, letting `configure` override any subset of the
/// wildcard defaults.
///
/// Pass `|_| {}` (or use `CorsConfig::default().into_middleware()`) to keep
/// every header at `*`.
pub fn cors<F>(configure: F) -> Cors
where
    F: FnOnce(&mut CorsConfig),
{
    let mut config = CorsConfig::default();
    configure(&mut config);
    config.into_middleware()
}

/// The middleware returned by [`cors`] and [`CorsConfig::into_middleware`].
#[derive(Clone, Debug)]
pub struct Cors {
    headers: Arc<[(HeaderName, HeaderValue)]>,
}

impl Middleware for Cors {
    fn wrap(&self, next: HandlerFunc) -> HandlerFunc {
        let headers = Arc::clone(&self.headers);
        run_before(move |res, _req| {
            for (name, value) in headers.iter() {
                res.set_header(name.clone(), value.clone());
            }
        })
        .wrap(next)
    }
}
