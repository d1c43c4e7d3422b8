//! Asset store backed by a build output directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use percent_encoding::percent_decode_str;
use tokio::fs;

use crate::assets::cache::CachePolicy;
use crate::assets::{AssetError, AssetPath, AssetStore, StoredAsset};

/// Serves files below `root`; URL path `/a/b.js` maps to `root/a/b.js`.
#[derive(Debug)]
pub struct DirectoryAssetStore {
    root: PathBuf,
    policy: CachePolicy,
}

impl DirectoryAssetStore {
    pub fn new(root: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for `path`, or `None` if it could escape the root.
    /// Each URL segment is percent-decoded on its own and must decode to a
    /// single normal path component.
    fn resolve(&self, path: &AssetPath) -> Option<PathBuf> {
        let mut file = self.root.clone();
        let mut depth = 0;
        for segment in path.as_str().split('/').filter(|s| !s.is_empty()) {
            let decoded = percent_decode_str(segment).decode_utf8().ok()?;
            if decoded.contains(['/', '\\', '\0']) {
                return None;
            }
            let segment = Path::new(&*decoded);
            let mut components = segment.components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => file.push(segment),
                _ => return None,
            }
            depth += 1;
        }
        (depth > 0).then_some(file)
    }
}

#[async_trait]
impl AssetStore for DirectoryAssetStore {
    async fn get(&self, path: &AssetPath) -> Result<Option<StoredAsset>, AssetError> {
        let Some(file) = self.resolve(path) else {
            return Ok(None);
        };

        match fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AssetError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }

        let body = match fs::read(&file).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AssetError::Io {
                    path: path.clone(),
                    source,
                })
            }
        };

        let headers = self.policy.headers_for(path, &body);
        Ok(Some(StoredAsset { body, headers }))
    }
}
