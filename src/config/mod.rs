//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//!     → compiled into EdgeRouter + Bindings at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Static classification rules and header-strip lists are deployment inputs

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, AssetConfig, DocsConfig, EdgeConfig, GateConfig, ListenerConfig,
    ObservabilityConfig, SecurityConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
