//! Invocation runtime: what each `route` call receives besides the request.
//!
//! # Design Decisions
//! - Bindings are built once at startup and shared; the router never mutates them
//! - An ExecutionContext lives for exactly one invocation
//! - Background work goes through `wait_until`, never awaited inline

pub mod bindings;
pub mod context;

pub use bindings::{Bindings, BindingsError};
pub use context::{CancelHandle, ExecutionContext};
