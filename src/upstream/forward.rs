//! Request/response preparation for forwarded traffic.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Strip policy-configured headers (e.g. cookies to a third-party origin)
//! - Add X-Forwarded-Host / X-Forwarded-Proto
//! - Buffer the request body up to a limit
//!
//! # Design Decisions
//! - Headers named in `Connection` are treated as hop-by-hop too
//! - Host is always dropped; the client derives it from the target URL

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Request};
use axum::response::Response;
use url::Url;

use crate::error::RouteError;

/// Headers that are meaningful only for a single transport hop.
pub const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Parse configured header names, skipping invalid entries.
pub fn header_names(names: &[String]) -> Vec<HeaderName> {
    names
        .iter()
        .filter_map(|name| match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => Some(name),
            Err(_) => {
                tracing::warn!(header = %name, "Ignoring invalid header name");
                None
            }
        })
        .collect()
}

/// Remove hop-by-hop headers, anything listed in `Connection`, and `extra`.
pub fn strip_headers(headers: &mut HeaderMap, extra: &[HeaderName]) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in HOP_BY_HOP.iter().chain(&listed).chain(extra) {
        headers.remove(name);
    }
    headers.remove(header::UPGRADE);
}

/// Buffer a request body, enforcing `limit`.
pub async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, RouteError> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| RouteError::BodyTooLarge { limit })
}

/// Build the outbound request for `target` from the inbound parts.
pub fn outbound_request(
    parts: &Parts,
    body: Bytes,
    target: &Url,
    original: &Url,
    strip: &[HeaderName],
) -> Result<Request<Bytes>, RouteError> {
    let mut headers = parts.headers.clone();
    strip_headers(&mut headers, strip);
    headers.remove(header::HOST);

    if let Some(host) = original.host_str() {
        let host = match original.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&host) {
            headers.insert(HeaderName::from_static("x-forwarded-host"), value);
        }
    }
    if let Ok(value) = HeaderValue::from_str(original.scheme()) {
        headers.insert(HeaderName::from_static("x-forwarded-proto"), value);
    }

    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(target.as_str())
        .body(body)
        .map_err(|e| RouteError::MalformedRequest(e.to_string()))?;
    *request.headers_mut() = headers;
    Ok(request)
}

/// Strip hop-by-hop and policy headers from an upstream response.
pub fn inbound_response(mut response: Response, strip: &[HeaderName]) -> Response {
    strip_headers(response.headers_mut(), strip);
    response
}
