//! Capability bundle handed to every routing invocation.

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderName;
use url::Url;

use crate::assets::cache::CachePolicy;
use crate::assets::{AssetStore, DirectoryAssetStore, MemoryAssetStore};
use crate::config::EdgeConfig;
use crate::render::{AppRenderer, GateRule, GatedRenderer, OriginRenderer};
use crate::upstream::{FetchError, Fetcher, HttpFetcher};

/// Errors building bindings from configuration.
#[derive(Debug, thiserror::Error)]
pub enum BindingsError {
    #[error("invalid {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("invalid permissions header: {0}")]
    InvalidHeader(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] FetchError),
}

/// Asset store, fetch capability, renderer and docs origin.
/// Shared read-only by all invocations.
#[derive(Clone)]
pub struct Bindings {
    pub assets: Arc<dyn AssetStore>,
    pub fetcher: Arc<dyn Fetcher>,
    pub renderer: Arc<dyn AppRenderer>,
    pub docs_origin: Option<Url>,
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("assets", &self.assets)
            .field("renderer", &self.renderer)
            .field("docs_origin", &self.docs_origin.as_ref().map(Url::as_str))
            .finish_non_exhaustive()
    }
}

impl Bindings {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        fetcher: Arc<dyn Fetcher>,
        renderer: Arc<dyn AppRenderer>,
        docs_origin: Option<Url>,
    ) -> Self {
        Self {
            assets,
            fetcher,
            renderer,
            docs_origin,
        }
    }

    /// Build production bindings: directory (or empty) asset store, HTTP
    /// fetcher, and the gated origin renderer.
    pub fn from_config(config: &EdgeConfig) -> Result<Self, BindingsError> {
        let policy = CachePolicy::new(
            config.assets.immutable_prefixes.clone(),
            &config.assets.default_cache_control,
        );
        let assets: Arc<dyn AssetStore> = match &config.assets.directory {
            Some(dir) => Arc::new(DirectoryAssetStore::new(dir, policy)),
            None => {
                tracing::warn!("No asset directory configured; static routes will fall through");
                Arc::new(MemoryAssetStore::new(policy))
            }
        };

        let fetcher = Arc::new(HttpFetcher::new(&config.timeouts)?);

        let app_origin = Url::parse(&config.app.origin).map_err(|e| BindingsError::InvalidUrl {
            field: "app.origin",
            reason: e.to_string(),
        })?;
        let permissions_header = HeaderName::from_bytes(config.app.permissions_header.as_bytes())
            .map_err(|e| BindingsError::InvalidHeader(e.to_string()))?;
        let renderer = GatedRenderer::new(
            OriginRenderer::new(app_origin, config.security.max_body_size),
            config.app.gates.iter().map(GateRule::from).collect(),
            permissions_header,
        );

        let docs_origin = config
            .docs
            .origin
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| BindingsError::InvalidUrl {
                field: "docs.origin",
                reason: e.to_string(),
            })?;

        Ok(Self::new(assets, fetcher, Arc::new(renderer), docs_origin))
    }
}
