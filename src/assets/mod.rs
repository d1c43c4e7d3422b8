//! Static asset subsystem.
//!
//! # Data Flow
//! ```text
//! Static candidate path
//!     → AssetStore::get (memory.rs / directory.rs)
//!     → StoredAsset (bytes + content headers)
//!     → served byte-for-byte by the router
//! ```
//!
//! # Design Decisions
//! - Stores are read-only from the router's point of view
//! - "Not found" is `Ok(None)`, never an error
//! - Content headers (content-type, cache-control, etag) are computed once at
//!   insert/load time and served unchanged

pub mod cache;
pub mod directory;
pub mod memory;
pub mod mime;

use std::fmt::{self, Debug};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::HeaderMap;

pub use directory::DirectoryAssetStore;
pub use memory::MemoryAssetStore;

/// Normalized URL path of an asset (always starts with `/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetPath(String);

impl AssetPath {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.starts_with('/') {
            Self(path)
        } else {
            Self(format!("/{path}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased extension of the final path segment, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.0.rsplit('/').next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A built asset and the headers it is served with.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub body: Bytes,
    pub headers: HeaderMap,
}

/// Failure reading from an asset store.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: AssetPath,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only lookup of built assets.
#[async_trait]
pub trait AssetStore: Send + Sync + Debug {
    async fn get(&self, path: &AssetPath) -> Result<Option<StoredAsset>, AssetError>;
}
