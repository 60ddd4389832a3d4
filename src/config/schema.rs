//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every field is defaulted, so an empty file is a valid configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rewrite::cache::DEFAULT_CAPACITY;

/// Root configuration for the rewriter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RewriterConfig {
    /// Rewriting behaviour and the global fallback.
    pub rewrite: RewriteSettings,

    /// Named domains: symbolic name → replacement base URL.
    pub domains: BTreeMap<String, String>,

    pub admin: AdminConfig,

    pub observability: ObservabilityConfig,
}

/// Rewriting settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteSettings {
    /// Rewrite requests at all. Off means every request passes through.
    pub enabled: bool,

    /// Base URL used for requests without a domain hint.
    pub global_domain: Option<String>,

    /// Base URL the client was built with; activates advanced mode.
    pub advanced_base_url: Option<String>,

    /// Entries per strategy cache.
    pub cache_capacity: usize,
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            global_domain: None,
            advanced_base_url: None,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token). Required when enabled.
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
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
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: RewriterConfig = toml::from_str("").unwrap();
        assert!(config.rewrite.enabled);
        assert_eq!(config.rewrite.cache_capacity, DEFAULT_CAPACITY);
        assert!(config.domains.is_empty());
        assert!(!config.admin.enabled);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_full_file() {
        let config: RewriterConfig = toml::from_str(
            r#"
            [rewrite]
            enabled = false
            global_domain = "https://api.example.com"
            advanced_base_url = "https://a.com/wiki/part"
            cache_capacity = 16

            [domains]
            douban = "https://api.douban.com"
            gank = "https://gank.io/api"

            [admin]
            enabled = true
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert!(!config.rewrite.enabled);
        assert_eq!(config.rewrite.global_domain.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.rewrite.cache_capacity, 16);
        assert_eq!(config.domains.len(), 2);
        assert_eq!(config.domains["gank"], "https://gank.io/api");
        assert_eq!(config.admin.bind_address, "127.0.0.1:8081");
    }
}
