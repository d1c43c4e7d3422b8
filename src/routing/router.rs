//! Request classification and dispatch.
//!
//! # Responsibilities
//! - Classify each request: static asset > docs proxy > application renderer
//! - Serve static assets byte-for-byte with their stored headers
//! - Forward docs requests to the documentation origin (one attempt)
//! - Delegate everything else to the application renderer exactly once
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Classification is sequential and short-circuiting; the order is fixed
//! - Static classification is a hint: a store miss falls through to the next route
//! - Every path yields a response; failures become HTTP error responses

use std::time::Instant;

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::assets::cache::etag_matches;
use crate::assets::{AssetPath, StoredAsset};
use crate::config::EdgeConfig;
use crate::error::RouteError;
use crate::http::{request_id, RequestTarget};
use crate::observability::metrics;
use crate::routing::decision::RoutingDecision;
use crate::routing::matcher::{
    AnyMatcher, ExactPathMatcher, ExtensionMatcher, HostMatcher, Matcher, PathPrefixMatcher,
    RawPrefixMatcher,
};
use crate::runtime::{Bindings, ExecutionContext};
use crate::upstream::forward;

/// Docs route: a path prefix, optionally a whole host.
#[derive(Debug)]
struct DocsRoute {
    prefix: PathPrefixMatcher,
    host: Option<HostMatcher>,
}

impl DocsRoute {
    /// Upstream URL for `target` under `origin`, if this route claims it.
    fn rewrite(&self, target: &RequestTarget, origin: &Url) -> Option<Url> {
        let rest = if self.host.as_ref().is_some_and(|h| h.matches(target)) {
            target.path()
        } else {
            self.prefix.strip(target.path())?
        };

        let base = origin.path().trim_end_matches('/');
        let rest = if rest.is_empty() { "/" } else { rest };

        let mut url = origin.clone();
        url.set_path(&format!("{base}{rest}"));
        url.set_query(target.query());
        url.set_fragment(None);
        Some(url)
    }
}

/// Outcome of classification, carrying what the dispatch step needs.
enum Dispatch {
    Static(AssetPath, StoredAsset),
    Docs(Url),
    App,
}

impl Dispatch {
    fn decision(&self) -> RoutingDecision {
        match self {
            Dispatch::Static(path, _) => RoutingDecision::ServeStatic(path.clone()),
            Dispatch::Docs(url) => RoutingDecision::ProxyDocs(url.clone()),
            Dispatch::App => RoutingDecision::RenderApp,
        }
    }
}

/// The edge router. Holds only immutable, compiled configuration.
#[derive(Debug)]
pub struct EdgeRouter {
    static_rule: AnyMatcher,
    docs: DocsRoute,
    strip_request: Vec<HeaderName>,
    strip_response: Vec<HeaderName>,
    max_body_size: usize,
}

impl EdgeRouter {
    /// Compile the routing rules from configuration.
    pub fn from_config(config: &EdgeConfig) -> Self {
        let mut static_matchers: Vec<Box<dyn Matcher>> = vec![
            Box::new(ExtensionMatcher::new(&config.assets.extensions)),
            Box::new(ExactPathMatcher::new(config.assets.exact_paths.iter().cloned())),
        ];
        for prefix in &config.assets.prefixes {
            static_matchers.push(Box::new(RawPrefixMatcher::new(prefix.clone())));
        }

        Self {
            static_rule: AnyMatcher::new(static_matchers),
            docs: DocsRoute {
                prefix: PathPrefixMatcher::new(config.docs.prefix.clone()),
                host: config.docs.host.clone().map(HostMatcher::new),
            },
            strip_request: forward::header_names(&config.docs.strip_request_headers),
            strip_response: forward::header_names(&config.docs.strip_response_headers),
            max_body_size: config.security.max_body_size,
        }
    }

    /// Routing decision for `request` without dispatching it.
    pub async fn decide<B>(&self, request: &Request<B>, env: &Bindings) -> Result<RoutingDecision, RouteError> {
        let target = RequestTarget::from_request(request)?;
        Ok(self.resolve(&target, env).await.decision())
    }

    /// Route one request and produce its response. Never fails.
    pub async fn route(&self, request: Request<Body>, env: &Bindings, ctx: &ExecutionContext) -> Response {
        let start_time = Instant::now();
        let request_id = request_id(&request);

        let target = match RequestTarget::from_request(&request) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(request_id = %request_id, uri = %request.uri(), error = %e, "Rejecting malformed request");
                metrics::record_request("malformed", StatusCode::BAD_REQUEST.as_u16(), start_time);
                return e.into_response();
            }
        };

        let dispatch = self.resolve(&target, env).await;
        let kind = dispatch.decision().kind();

        tracing::debug!(
            request_id = %request_id,
            method = %request.method(),
            path = %target.path(),
            target = kind,
            "Dispatching request"
        );

        let response = match dispatch {
            Dispatch::Static(_, asset) => serve_static(&request, asset),
            Dispatch::Docs(url) => {
                let upstream = url.clone();
                match self.proxy_docs(request, &target, url, env, ctx).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Docs proxy failed");
                        e.into_response()
                    }
                }
            }
            Dispatch::App => env.renderer.render(request, env, ctx).await,
        };

        metrics::record_request(kind, response.status().as_u16(), start_time);
        response
    }

    async fn resolve(&self, target: &RequestTarget, env: &Bindings) -> Dispatch {
        if self.static_rule.matches(target) {
            let path = AssetPath::new(target.path());
            match env.assets.get(&path).await {
                Ok(Some(asset)) => return Dispatch::Static(path, asset),
                Ok(None) => {
                    tracing::debug!(path = %path, "Static candidate not in asset store");
                    metrics::record_asset_fallthrough("not_found");
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Asset store lookup failed");
                    metrics::record_asset_fallthrough("store_error");
                }
            }
        }

        if let Some(origin) = &env.docs_origin {
            if let Some(url) = self.docs.rewrite(target, origin) {
                return Dispatch::Docs(url);
            }
        }

        Dispatch::App
    }

    async fn proxy_docs(
        &self,
        request: Request<Body>,
        target: &RequestTarget,
        url: Url,
        env: &Bindings,
        ctx: &ExecutionContext,
    ) -> Result<Response, RouteError> {
        let (parts, body) = request.into_parts();
        let body = forward::buffer_body(body, self.max_body_size).await?;
        let outbound = forward::outbound_request(&parts, body, &url, target.url(), &self.strip_request)?;

        let response = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(RouteError::Cancelled),
            result = env.fetcher.fetch(outbound) => result?,
        };

        Ok(forward::inbound_response(response, &self.strip_response))
    }
}

/// Build the response for a stored asset. HEAD and conditional GET are
/// honored; the stored headers are sent unchanged.
fn serve_static(request: &Request<Body>, asset: StoredAsset) -> Response {
    let not_modified = match (
        request.headers().get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()),
        asset.headers.get(header::ETAG).and_then(|v| v.to_str().ok()),
    ) {
        (Some(if_none_match), Some(etag)) => etag_matches(if_none_match, etag),
        _ => false,
    };

    let length = asset.body.len();
    let (status, body) = if not_modified {
        (StatusCode::NOT_MODIFIED, Body::empty())
    } else if request.method() == Method::HEAD {
        (StatusCode::OK, Body::empty())
    } else {
        (StatusCode::OK, Body::from(asset.body))
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = asset.headers;
    if request.method() == Method::HEAD && status == StatusCode::OK {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    response
}
