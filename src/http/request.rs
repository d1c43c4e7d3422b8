//! Request identification and target parsing.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) for every request
//! - Parse the request target into a normalized URL (host, path, query)
//! - Reject requests whose target cannot be parsed
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Dot segments are resolved before routing, so classification never sees `..`
//! - One canonical path (repeated `/` merged, unreserved escapes decoded) feeds
//!   classification, gating and forwarding alike
//! - Host comes from the URI authority first, then the Host header

use axum::http::{header, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::error::RouteError;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of `request`, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Parsed and normalized request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    url: Url,
}

impl RequestTarget {
    /// Parse the target of `request`. Fails with `MalformedRequest`.
    pub fn from_request<B>(request: &Request<B>) -> Result<Self, RouteError> {
        let uri = request.uri();
        let scheme = uri.scheme_str().unwrap_or("http");

        let host = match uri.authority() {
            Some(authority) => authority.as_str().to_string(),
            None => match request.headers().get(header::HOST) {
                Some(value) => value
                    .to_str()
                    .map_err(|_| RouteError::MalformedRequest("Host header is not valid text".into()))?
                    .to_string(),
                None => "localhost".to_string(),
            },
        };
        if host.is_empty() || host.contains(['/', '?', '#', '@']) {
            return Err(RouteError::MalformedRequest(format!("invalid host '{host}'")));
        }

        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        if !path_and_query.starts_with('/') {
            return Err(RouteError::MalformedRequest(format!(
                "request target '{path_and_query}' is not an absolute path"
            )));
        }

        let mut url = Url::parse(&format!("{scheme}://{host}{path_and_query}"))
            .map_err(|e| RouteError::MalformedRequest(e.to_string()))?;
        let canonical = canonical_path(url.path());
        if canonical != url.path() {
            url.set_path(&canonical);
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }
}

/// Merge repeated `/` and decode percent-encoded unreserved characters
/// (RFC 3986 section 6.2.2.2). Other escapes are kept, with uppercase hex.
fn canonical_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if out.ends_with('/') => i += 1,
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        let decoded = hi << 4 | lo;
                        if decoded.is_ascii_alphanumeric() || matches!(decoded, b'-' | b'.' | b'_' | b'~') {
                            out.push(char::from(decoded));
                        } else {
                            out.push('%');
                            out.push(char::from(bytes[i + 1].to_ascii_uppercase()));
                            out.push(char::from(bytes[i + 2].to_ascii_uppercase()));
                        }
                        i += 3;
                    }
                    _ => {
                        out.push('%');
                        i += 1;
                    }
                }
            }
            _ => {
                let ch = path[i..].chars().next().unwrap_or_default();
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    out
}

fn hex_value(byte: u8) -> Option<u8> {
    char::from(byte).to_digit(16).map(|d| d as u8)
}
