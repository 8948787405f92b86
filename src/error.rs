//! Unified error type.

/// The error type returned by strata's fallible operations.
///
/// Composition itself never fails. Application-level errors (404, 422, etc.)
/// are expressed by writing a status to the [`Response`](crate::Response).
/// This type surfaces the remaining failures: decoding a CORS document and
/// running the server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
