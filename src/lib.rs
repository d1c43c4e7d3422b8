//! Edge request router.
//!
//! Decides, per request, whether to serve a built static asset, proxy to the
//! documentation origin, or hand off to the application renderer.

pub mod assets;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod runtime;
pub mod upstream;

pub use config::EdgeConfig;
pub use error::RouteError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{EdgeRouter, RoutingDecision};
pub use runtime::{Bindings, ExecutionContext};
