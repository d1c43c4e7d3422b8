//! In-memory asset store.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::assets::cache::CachePolicy;
use crate::assets::{AssetError, AssetPath, AssetStore, StoredAsset};

/// Asset store populated up front, e.g. from an embedded build manifest.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<AssetPath, StoredAsset>,
    policy: CachePolicy,
}

impl MemoryAssetStore {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            assets: HashMap::new(),
            policy,
        }
    }

    /// Insert an asset, deriving its content headers from the policy.
    pub fn insert(&mut self, path: impl Into<String>, body: impl Into<Bytes>) -> &mut Self {
        let path = AssetPath::new(path);
        let body = body.into();
        let headers = self.policy.headers_for(&path, &body);
        self.assets.insert(path, StoredAsset { body, headers });
        self
    }

    /// Insert an asset with explicit headers, stored as given.
    pub fn insert_with_headers(
        &mut self,
        path: impl Into<String>,
        body: impl Into<Bytes>,
        headers: impl IntoIterator<Item = (HeaderName, HeaderValue)>,
    ) -> &mut Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(name, value);
        }
        self.assets.insert(
            AssetPath::new(path),
            StoredAsset {
                body: body.into(),
                headers: map,
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn get(&self, path: &AssetPath) -> Result<Option<StoredAsset>, AssetError> {
        Ok(self.assets.get(path).cloned())
    }
}
