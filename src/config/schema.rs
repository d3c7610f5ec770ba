//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for quake-finder.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// USGS catalogue client settings.
    pub usgs: UsgsConfig,

    /// Retry configuration for upstream requests.
    pub retries: RetryConfig,

    /// Search result cache.
    pub cache: CacheConfig,

    /// Background search tasks.
    pub tasks: TaskConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub site: SiteConfig,

    /// Cities registered at start-up.
    pub cities: Vec<CitySeed>,
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

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout in seconds.
    pub request_secs: u64,

    /// Per-attempt timeout for USGS requests in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// USGS FDSN event service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsgsConfig {
    /// Query endpoint returning GeoJSON.
    pub base_url: String,

    /// Smallest magnitude to request.
    pub min_magnitude: f64,

    /// Ordering passed as `orderby`.
    pub order_by: String,
}

impl Default for UsgsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://earthquake.usgs.gov/fdsnws/event/1/query.geojson".to_string(),
            min_magnitude: 5.0,
            order_by: "time".to_string(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the result cache.
    pub enabled: bool,

    /// Time-to-live of a cached outcome in seconds.
    pub ttl_secs: u64,

    /// Optional JSON file the cache is loaded from and saved to.
    pub persistence_path: Option<String>,

    /// Interval between sweeps of expired outcomes, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 24 * 60 * 60, // 1 day
            persistence_path: None,
            sweep_interval_secs: 10 * 60,
        }
    }
}

/// Background task configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TaskConfig {
    /// How long finished task results stay queryable, in seconds.
    pub result_ttl_secs: u64,

    /// Interval between sweeps of expired task results, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            result_ttl_secs: 60 * 60,
            sweep_interval_secs: 60,
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
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Page chrome settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Document title used when a route declares no `title` meta.
    pub default_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_title: "USGS Earthquake".to_string(),
        }
    }
}

/// A city registered from configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CitySeed {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}
