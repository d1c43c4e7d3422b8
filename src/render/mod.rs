//! Application renderer subsystem.
//!
//! # Data Flow
//! ```text
//! Request not claimed by static or docs routes
//!     → gate.rs (permission check for gated paths)
//!     → origin.rs (forward to the SSR origin)
//!     → Response returned verbatim by the router
//! ```
//!
//! # Design Decisions
//! - The router treats the renderer as an opaque black box
//! - Renderer failures are the renderer's own responses; the router never wraps them
//! - Permission gating is a stateless capability check, composed by wrapping

pub mod gate;
pub mod origin;

use std::fmt::Debug;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::runtime::{Bindings, ExecutionContext};

pub use gate::{gate, GateRule, GatedRenderer, Permissions};
pub use origin::OriginRenderer;

/// The application's own request handler.
#[async_trait]
pub trait AppRenderer: Send + Sync + Debug {
    async fn render(&self, request: Request<Body>, env: &Bindings, ctx: &ExecutionContext) -> Response;
}
