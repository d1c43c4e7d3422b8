//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, parse + normalize target)
//!     → routing::EdgeRouter (static / docs / app)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, RequestTarget, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
