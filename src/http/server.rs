//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (concurrency limit, request ID, tracing, timeout)
//! - Bind server to listener
//! - Turn each request into one `EdgeRouter::route` invocation

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::State, http::Request, response::Response, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EdgeConfig;
use crate::http::request::{request_id, UuidRequestId};
use crate::routing::EdgeRouter;
use crate::runtime::{Bindings, ExecutionContext};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EdgeRouter>,
    pub bindings: Bindings,
}

/// HTTP front door for the edge router.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and bindings.
    pub fn new(config: EdgeConfig, bindings: Bindings) -> Self {
        let state = AppState {
            router: Arc::new(EdgeRouter::from_config(&config)),
            bindings,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .fallback(edge_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            docs_prefix = %self.config.docs.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// The assembled service, for driving requests without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Catch-all handler: one request, one routing invocation.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (ctx, _cancel) = ExecutionContext::new();
    state.router.route(request, &state.bindings, &ctx).await
}
