//! Renderer that forwards to the application's SSR origin.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::http::RequestTarget;
use crate::render::AppRenderer;
use crate::runtime::{Bindings, ExecutionContext};
use crate::upstream::forward;

/// Forwards requests unchanged (path and query intact) to `origin`.
#[derive(Debug, Clone)]
pub struct OriginRenderer {
    origin: Url,
    max_body_size: usize,
}

impl OriginRenderer {
    pub fn new(origin: Url, max_body_size: usize) -> Self {
        Self {
            origin,
            max_body_size,
        }
    }

    fn target_url(&self, target: &RequestTarget) -> Url {
        let mut url = self.origin.clone();
        url.set_path(target.path());
        url.set_query(target.query());
        url
    }
}

#[async_trait]
impl AppRenderer for OriginRenderer {
    async fn render(&self, request: Request<Body>, env: &Bindings, _ctx: &ExecutionContext) -> Response {
        let target = match RequestTarget::from_request(&request) {
            Ok(target) => target,
            Err(e) => return e.into_response(),
        };
        let (parts, body) = request.into_parts();
        let body = match forward::buffer_body(body, self.max_body_size).await {
            Ok(body) => body,
            Err(e) => return e.into_response(),
        };

        let url = self.target_url(&target);
        let outbound = match forward::outbound_request(&parts, body, &url, target.url(), &[]) {
            Ok(outbound) => outbound,
            Err(e) => return e.into_response(),
        };

        match env.fetcher.fetch(outbound).await {
            Ok(response) => forward::inbound_response(response, &[]),
            Err(e) => {
                tracing::error!(origin = %self.origin, path = %target.path(), error = %e, "Application origin unreachable");
                (StatusCode::BAD_GATEWAY, "Application unavailable").into_response()
            }
        }
    }
}
