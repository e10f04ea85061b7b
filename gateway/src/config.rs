use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cors::CorsPolicy;

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listen address
    pub http_addr: String,

    /// Upstream gRPC endpoint (must include the scheme)
    pub upstream_addr: String,

    /// Deadline for a single upstream call in seconds (0 = no deadline)
    pub upstream_timeout_secs: u64,

    /// Timeout for establishing the upstream connection in seconds
    pub connect_timeout_secs: u64,

    /// Maximum items collected from a server-streaming call
    pub max_stream_items: usize,

    /// Allowed CORS origins (`*` allows any origin)
    pub cors_origins: Vec<String>,

    /// Service version
    pub version: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8000".to_string(),
            upstream_addr: "http://[::1]:50051".to_string(),
            upstream_timeout_secs: 30,
            connect_timeout_secs: 5,
            max_stream_items: 100,
            cors_origins: vec!["*".to_string()],
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("GATEWAY_HTTP_ADDR") {
            config.http_addr = addr;
        }

        if let Some(addr) = lookup("GATEWAY_UPSTREAM_ADDR") {
            config.upstream_addr = addr;
        }

        if let Some(timeout) = lookup("GATEWAY_UPSTREAM_TIMEOUT_SECS") {
            if let Ok(n) = timeout.parse() {
                config.upstream_timeout_secs = n;
            }
        }

        if let Some(timeout) = lookup("GATEWAY_CONNECT_TIMEOUT_SECS") {
            if let Ok(n) = timeout.parse() {
                config.connect_timeout_secs = n;
            }
        }

        if let Some(max_items) = lookup("GATEWAY_MAX_STREAM_ITEMS") {
            if let Ok(n) = max_items.parse() {
                config.max_stream_items = n;
            }
        }

        if let Some(origins) = lookup("GATEWAY_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        config
    }

    /// Upstream call deadline, `None` when disabled
    pub fn upstream_timeout(&self) -> Option<Duration> {
        (self.upstream_timeout_secs > 0).then(|| Duration::from_secs(self.upstream_timeout_secs))
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn cors_policy(&self) -> CorsPolicy {
        CorsPolicy::from_origins(&self.cors_origins)
    }
}
