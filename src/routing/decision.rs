//! Routing decision type.

use std::fmt;

use url::Url;

use crate::assets::AssetPath;

/// Where a single request is dispatched. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Serve a built asset from the asset store.
    ServeStatic(AssetPath),
    /// Forward to the documentation origin at the rewritten URL.
    ProxyDocs(Url),
    /// Hand the request to the application renderer.
    RenderApp,
}

impl RoutingDecision {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingDecision::ServeStatic(_) => "static",
            RoutingDecision::ProxyDocs(_) => "docs",
            RoutingDecision::RenderApp => "app",
        }
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingDecision::ServeStatic(path) => write!(f, "static {path}"),
            RoutingDecision::ProxyDocs(url) => write!(f, "docs {url}"),
            RoutingDecision::RenderApp => f.write_str("app"),
        }
    }
}
