//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the suggestion service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SuggestConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Prefix store actor settings.
    pub store: StoreConfig,

    /// Cross-origin resource sharing policy.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request validation settings.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Store actor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Inserts that may wait in the queue before callers block.
    pub insert_queue_depth: usize,

    /// Lookups that may wait in the queue before callers block.
    pub lookup_queue_depth: usize,

    /// Upper bound on a whole store exchange in milliseconds (0 = wait forever).
    pub request_timeout_ms: u64,
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            insert_queue_depth: 1,
            lookup_queue_depth: 1,
            request_timeout_ms: 5000,
        }
    }
}

/// CORS policy. An empty `allow_origin` list disables CORS handling.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: Vec<String>,
    pub allow_credentials: bool,
    pub expose_headers: Vec<String>,
    pub allow_headers: Vec<String>,
    /// Preflight cache lifetime in seconds (0 = header not sent).
    pub max_age_secs: u64,
}

impl CorsConfig {
    pub fn is_enabled(&self) -> bool {
        !self.allow_origin.is_empty()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
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
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Reject malformed insert bodies and surface insert failures.
    pub strict_validation: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            strict_validation: false,
        }
    }
}
