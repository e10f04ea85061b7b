use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::source::Locale;

/// News service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// gRPC server address
    pub grpc_addr: String,

    /// Country code used for the news stream
    pub stream_country: String,

    /// Language used for bulk and fresh news
    pub bulk_language: String,

    /// Pause between product stream messages in milliseconds
    pub product_interval_ms: u64,

    /// newsapi.org compatible base URL
    pub news_api_url: String,

    /// newsapi.org key; the built-in sample feed is served without one
    pub news_api_key: Option<String>,

    /// Service version
    pub version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            grpc_addr: "[::1]:50051".to_string(),
            stream_country: "us".to_string(),
            bulk_language: "en".to_string(),
            product_interval_ms: 100,
            news_api_url: "https://newsapi.org".to_string(),
            news_api_key: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("NEWS_SERVICE_ADDR") {
            config.grpc_addr = addr;
        }

        if let Ok(country) = std::env::var("NEWS_STREAM_COUNTRY") {
            config.stream_country = country;
        }

        if let Ok(language) = std::env::var("NEWS_BULK_LANGUAGE") {
            config.bulk_language = language;
        }

        if let Ok(interval) = std::env::var("PRODUCT_STREAM_INTERVAL_MS") {
            if let Ok(n) = interval.parse() {
                config.product_interval_ms = n;
            }
        }

        if let Ok(url) = std::env::var("NEWS_API_URL") {
            config.news_api_url = url;
        }

        config.news_api_key = std::env::var("NEWS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        config
    }

    pub fn stream_locale(&self) -> Locale {
        Locale::Country(self.stream_country.clone())
    }

    pub fn bulk_locale(&self) -> Locale {
        Locale::Language(self.bulk_language.clone())
    }

    /// Get product stream pause as Duration
    pub fn product_interval(&self) -> Duration {
        Duration::from_millis(self.product_interval_ms)
    }
}
