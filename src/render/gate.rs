//! Permission gating in front of the application renderer.
//!
//! # Responsibilities
//! - Parse the caller's granted permissions from a trusted request header
//! - Match gated path prefixes
//! - Render the inner application or an access-restricted fallback
//!
//! # Design Decisions
//! - `gate` is a pure capability check; no roles, no inheritance
//! - The permissions header is injected by the identity layer in front of
//!   the edge; this module does not authenticate callers
//! - Ungated paths pass straight through

use std::collections::HashSet;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::{BoxFuture, FutureExt};

use crate::config::GateConfig;
use crate::http::RequestTarget;
use crate::render::AppRenderer;
use crate::routing::matcher::PathPrefixMatcher;
use crate::runtime::{Bindings, ExecutionContext};

/// Set of permissions granted to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions(HashSet<String>);

impl Permissions {
    /// Parse a comma and/or whitespace separated list.
    pub fn parse(value: &str) -> Self {
        Self(
            value
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Collect permissions from every instance of `name` in `headers`.
    pub fn from_headers(headers: &HeaderMap, name: &HeaderName) -> Self {
        let mut granted = HashSet::new();
        for value in headers.get_all(name).iter().filter_map(|v| v.to_str().ok()) {
            granted.extend(Self::parse(value).0);
        }
        Self(granted)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }
}

impl<S: Into<String>> FromIterator<S> for Permissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Run `on_allowed` if `required` is granted, otherwise `on_denied`.
pub fn gate<T>(
    permissions: &Permissions,
    required: &str,
    on_allowed: impl FnOnce() -> T,
    on_denied: impl FnOnce() -> T,
) -> T {
    if permissions.contains(required) {
        on_allowed()
    } else {
        on_denied()
    }
}

/// A gated path prefix and the permission it requires.
#[derive(Debug, Clone)]
pub struct GateRule {
    prefix: PathPrefixMatcher,
    permission: String,
}

impl GateRule {
    pub fn new(path_prefix: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            prefix: PathPrefixMatcher::new(path_prefix),
            permission: permission.into(),
        }
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }
}

impl From<&GateConfig> for GateRule {
    fn from(config: &GateConfig) -> Self {
        Self::new(config.path_prefix.clone(), config.permission.clone())
    }
}

/// Wraps a renderer with permission gates.
#[derive(Debug)]
pub struct GatedRenderer<R> {
    inner: R,
    rules: Vec<GateRule>,
    permissions_header: HeaderName,
}

impl<R: AppRenderer> GatedRenderer<R> {
    pub fn new(inner: R, rules: Vec<GateRule>, permissions_header: HeaderName) -> Self {
        Self {
            inner,
            rules,
            permissions_header,
        }
    }

    fn rule_for(&self, path: &str) -> Option<&GateRule> {
        self.rules.iter().find(|rule| rule.prefix.strip(path).is_some())
    }
}

fn access_restricted(permission: &str) -> Response {
    let mut response = (
        StatusCode::FORBIDDEN,
        format!("Access restricted: the `{permission}` permission is required to view this page."),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    response
}

#[async_trait]
impl<R: AppRenderer> AppRenderer for GatedRenderer<R> {
    async fn render(&self, request: Request<Body>, env: &Bindings, ctx: &ExecutionContext) -> Response {
        let path = match RequestTarget::from_request(&request) {
            Ok(target) => target.path().to_string(),
            Err(e) => return e.into_response(),
        };
        let Some(rule) = self.rule_for(&path) else {
            return self.inner.render(request, env, ctx).await;
        };

        let permissions = Permissions::from_headers(request.headers(), &self.permissions_header);
        let outcome: BoxFuture<'_, Response> = gate(
            &permissions,
            rule.permission(),
            || self.inner.render(request, env, ctx),
            || {
                tracing::info!(permission = %rule.permission(), "Gated page requested without permission");
                async move { access_restricted(rule.permission()) }.boxed()
            },
        );
        outcome.await
    }
}
