//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Static asset classification and storage.
    pub assets: AssetConfig,

    /// Documentation origin proxying.
    pub docs: DocsConfig,

    /// Application renderer settings.
    pub app: AppConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response at the edge) in seconds.
    pub request_secs: u64,

    /// Total time allowed for a single outbound fetch in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            upstream_secs: 15,
        }
    }
}

/// Static asset configuration.
///
/// A path is a static candidate when its extension is listed, it starts with one
/// of `prefixes`, or it appears in `exact_paths`. Candidates are then looked up
/// in the asset store; misses fall through to the next route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Build output directory. When unset, an empty in-memory store is used.
    pub directory: Option<String>,

    /// File extensions (without the dot) treated as static candidates.
    pub extensions: Vec<String>,

    /// Path prefixes treated as static candidates.
    pub prefixes: Vec<String>,

    /// Exact paths treated as static candidates.
    pub exact_paths: Vec<String>,

    /// Prefixes of content-hashed assets served with an immutable cache policy.
    pub immutable_prefixes: Vec<String>,

    /// Cache-Control value for every other asset.
    pub default_cache_control: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        let extensions = [
            "js", "mjs", "css", "map", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp",
            "avif", "woff", "woff2", "ttf", "otf", "txt", "xml", "webmanifest", "wasm",
        ];
        Self {
            directory: None,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            prefixes: vec!["/_app/".to_string(), "/assets/".to_string()],
            exact_paths: vec!["/favicon.ico".to_string(), "/robots.txt".to_string()],
            immutable_prefixes: vec!["/_app/immutable/".to_string()],
            default_cache_control: "public, max-age=0, must-revalidate".to_string(),
        }
    }
}

/// Documentation proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Path prefix routed to the documentation origin (segment-aware).
    pub prefix: String,

    /// Documentation origin base URL. Proxying is disabled when unset.
    pub origin: Option<String>,

    /// Host that is routed to the documentation origin in full.
    pub host: Option<String>,

    /// Extra request headers removed before forwarding.
    pub strip_request_headers: Vec<String>,

    /// Upstream response headers removed before returning to the client.
    pub strip_response_headers: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            prefix: "/docs".to_string(),
            origin: None,
            host: None,
            strip_request_headers: vec!["cookie".to_string(), "authorization".to_string()],
            strip_response_headers: vec!["set-cookie".to_string()],
        }
    }
}

/// Application renderer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the application renderer (SSR server).
    pub origin: String,

    /// Request header carrying the caller's granted permissions.
    pub permissions_header: String,

    /// Permission gates applied before the renderer is invoked.
    pub gates: Vec<GateConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:3000".to_string(),
            permissions_header: "x-user-permissions".to_string(),
            gates: vec![GateConfig {
                path_prefix: "/admin/audit-log".to_string(),
                permission: "org:audit_logs:read".to_string(),
            }],
        }
    }
}

/// A single permission gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateConfig {
    /// Path prefix protected by this gate (segment-aware).
    pub path_prefix: String,

    /// Permission required to reach the renderer.
    pub permission: String,
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size buffered for forwarded requests, in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("json" or "pretty").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
