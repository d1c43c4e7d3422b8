//! Router error taxonomy.
//!
//! # Design Decisions
//! - `route` never fails: every variant here is rendered into an HTTP response
//! - Error responses carry `cache-control: no-store` so failures are never cached
//! - Asset misses and renderer failures are not errors (fallthrough / passthrough)

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::upstream::FetchError;

/// Non-standard status used when the client went away mid-request.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Failures the edge router turns into error responses.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The request target could not be parsed into a URL.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The request body exceeded the configured buffer limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The documentation origin could not be reached.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetchFailed(#[from] FetchError),

    /// The execution context was cancelled while a fetch was in flight.
    #[error("request cancelled")]
    Cancelled,
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            RouteError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RouteError::UpstreamFetchFailed(FetchError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            RouteError::UpstreamFetchFailed(_) => StatusCode::BAD_GATEWAY,
            RouteError::Cancelled => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST)
            }
        }
    }

    fn message(&self) -> &'static str {
        match self {
            RouteError::MalformedRequest(_) => "Malformed request",
            RouteError::BodyTooLarge { .. } => "Request body too large",
            RouteError::UpstreamFetchFailed(FetchError::Timeout(_)) => "Documentation origin timed out",
            RouteError::UpstreamFetchFailed(_) => "Documentation origin unavailable",
            RouteError::Cancelled => "Request cancelled",
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.message()).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}
