//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, headers)
//!     → RequestTarget (parse + normalize; malformed → 400)
//!     → static rule (matcher.rs) → AssetStore hit?  → ServeStatic
//!     → docs rule (prefix / host)                   → ProxyDocs
//!     → otherwise                                   → RenderApp
//!
//! Route Compilation (at startup):
//!     EdgeConfig
//!     → Compile matchers (extension sets, prefixes, exact paths)
//!     → Freeze as immutable EdgeRouter
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix and set matching only)
//! - Deterministic: same input always yields the same decision
//! - Fixed priority: static > docs > app

pub mod decision;
pub mod matcher;
pub mod router;

pub use decision::RoutingDecision;
pub use router::EdgeRouter;
