//! Outbound fetch subsystem.
//!
//! # Data Flow
//! ```text
//! Routed request (docs proxy / app origin)
//!     → forward.rs (strip hop-by-hop + policy headers, add X-Forwarded-*)
//!     → Fetcher::fetch (one attempt, bounded by timeouts)
//!     → forward.rs (strip response headers)
//!     → Response back to the router
//! ```
//!
//! # Design Decisions
//! - Fetcher is a trait so the router can be driven by fakes in tests
//! - Exactly one attempt per call: no retries, no backoff
//! - Redirects are returned to the client, never followed
//! - Timeout errors are distinct from other errors (504 vs 502)

pub mod client;
pub mod forward;

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::Request;
use axum::response::Response;

pub use client::HttpFetcher;

/// Errors produced by a single outbound fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid outbound request: {0}")]
    InvalidRequest(String),
}

/// Outbound fetch capability.
#[async_trait]
pub trait Fetcher: Send + Sync + Debug {
    /// Execute exactly one outbound request.
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response, FetchError>;
}
