//! ETag generation, conditional matching and content header assembly.

use axum::http::{header, HeaderMap, HeaderValue};
use sha2::{Digest, Sha256};

use crate::assets::{mime, AssetPath};

pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Quoted strong ETag: content length plus a truncated SHA-256 digest.
/// Identical on every instance serving the same bytes.
pub fn generate_etag(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("\"{:x}-{}\"", content.len(), hex::encode(&digest[..16]))
}

/// True when an `If-None-Match` value matches `etag` (list, weak or `*`).
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let bare = etag.trim_start_matches("W/");
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/") == bare
    })
}

/// Cache and content policy applied when assets are loaded.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    immutable_prefixes: Vec<String>,
    default_cache_control: HeaderValue,
}

impl CachePolicy {
    pub fn new(immutable_prefixes: Vec<String>, default_cache_control: &str) -> Self {
        let default_cache_control = HeaderValue::from_str(default_cache_control)
            .unwrap_or_else(|_| HeaderValue::from_static("no-cache"));
        Self {
            immutable_prefixes,
            default_cache_control,
        }
    }

    fn cache_control(&self, path: &AssetPath) -> HeaderValue {
        if self
            .immutable_prefixes
            .iter()
            .any(|prefix| path.as_str().starts_with(prefix.as_str()))
        {
            HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL)
        } else {
            self.default_cache_control.clone()
        }
    }

    /// Content headers stored alongside an asset body.
    pub fn headers_for(&self, path: &AssetPath, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(mime::content_type(path.extension().as_deref())),
        );
        headers.insert(header::CACHE_CONTROL, self.cache_control(path));
        if let Ok(etag) = HeaderValue::from_str(&generate_etag(body)) {
            headers.insert(header::ETAG, etag);
        }
        headers
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(Vec::new(), "public, max-age=0, must-revalidate")
    }
}
