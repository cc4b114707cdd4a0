//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Upstream applications requests are forwarded to.
    pub upstreams: Vec<UpstreamConfig>,

    /// The ordered mount table. First match wins.
    pub mounts: Vec<MountConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstreams: default_upstreams(),
            mounts: default_mounts(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum in-flight requests (backpressure).
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

/// An upstream application the gateway can forward to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Unique upstream identifier, referenced by mounts.
    pub name: String,

    /// Origin URL, scheme and authority only (e.g., "http://127.0.0.1:9001").
    pub origin: String,
}

/// One entry of a mount table.
///
/// Exactly one of `upstream` (forward there) or `routes` (delegate to the
/// nested sub-table) must be set; validation enforces this.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Mount identifier for logging/metrics.
    pub name: String,

    /// Literal path prefix, written without a leading '/'. Empty means the
    /// entry always matches and delegation relies on fallthrough.
    #[serde(default)]
    pub prefix: String,

    /// Upstream name to forward matching requests to.
    #[serde(default)]
    pub upstream: Option<String>,

    /// Nested sub-table, consulted with the path remainder.
    #[serde(default)]
    pub routes: Option<Vec<MountConfig>>,
}

/// The standard table: the admin interface under `admin/`, then dashboard,
/// users, trading and the metrics exporter delegated at the root, in that
/// order. Sub-tables start empty; each deployment declares the prefixes its
/// applications actually claim.
fn default_mounts() -> Vec<MountConfig> {
    let delegation = |name: &str| MountConfig {
        name: name.to_string(),
        prefix: String::new(),
        upstream: None,
        routes: Some(Vec::new()),
    };

    vec![
        MountConfig {
            name: "admin".to_string(),
            prefix: "admin/".to_string(),
            upstream: Some("admin".to_string()),
            routes: None,
        },
        delegation("dashboard"),
        delegation("users"),
        delegation("trading"),
        delegation("metrics"),
    ]
}

fn default_upstreams() -> Vec<UpstreamConfig> {
    let local = |name: &str, port: u16| UpstreamConfig {
        name: name.to_string(),
        origin: format!("http://127.0.0.1:{}", port),
    };

    vec![
        local("admin", 9001),
        local("dashboard", 9002),
        local("users", 9003),
        local("trading", 9004),
        local("metrics", 9005),
    ]
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Idle upstream connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
