//! Outgoing HTTP response type.
//!
//! A [`Response`] is the response writer handed down the chain. Every layer
//! sees the same value: headers set by an outer middleware are visible to the
//! terminal handler, and bytes written by the terminal handler are followed by
//! anything an outer after-middleware writes on the way out.

use bytes::{Bytes, BytesMut};
use http::header::IntoHeaderName;
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;

/// An outgoing HTTP response being assembled by the handler chain.
///
/// ```rust
/// use http::{HeaderValue, StatusCode};
/// use strata::Response;
///
/// let mut res = Response::default();
/// res.set_status(StatusCode::CREATED);
/// res.set_header("location", HeaderValue::from_static("/users/42"));
/// res.write("created");
///
/// assert_eq!(res.header("Location"), Some("/users/42"));
/// assert_eq!(res.body(), b"created");
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Default for Response {
    fn default() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: BytesMut::new() }
    }
}

impl Response {
    pub fn status(&self) -> StatusCode { self.status }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Sets `name` to `value`, replacing every earlier value for that name.
    /// Names are matched case-insensitively.
    ///
    /// # Panics
    ///
    /// Panics if `name` is a `&'static str` that is not a valid header name.
    /// Use the typed constants in [`http::header`] or
    /// [`headers_mut`](Self::headers_mut) with a parsed `HeaderName` for
    /// names that are not known at compile time.
    pub fn set_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Appends bytes to the body.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }

    pub fn body(&self) -> &[u8] { &self.body }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_header_is_last_write_wins() {
        let mut res = Response::default();
        res.set_header("x-layer", HeaderValue::from_static("outer"));
        res.set_header("X-Layer", HeaderValue::from_static("inner"));

        assert_eq!(res.header("x-layer"), Some("inner"));
        assert_eq!(res.headers().get_all("x-layer").iter().count(), 1);
    }

    #[test]
    fn headers_mut_appends_alongside_set_header() {
        let mut res = Response::default();
        res.set_header("vary", HeaderValue::from_static("origin"));
        res.headers_mut().append("vary", HeaderValue::from_static("accept"));

        let values: Vec<_> = res.headers().get_all("vary").iter().collect();
        assert_eq!(values, ["origin", "accept"]);
    }

    #[test]
    #[should_panic]
    fn set_header_rejects_invalid_static_name() {
        Response::default().set_header("bad name", HeaderValue::from_static("x"));
    }

    #[test]
    fn writes_accumulate_in_order() {
        let mut res = Response::default();
        res.write("0 - ");
        res.write(b"1");
        assert_eq!(res.body(), b"0 - 1");
    }

    #[test]
    fn into_http_keeps_status_and_headers() {
        let mut res = Response::default();
        res.set_status(StatusCode::NO_CONTENT);
        res.set_header(http::header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

        let res = res.into_http();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
    }
}
