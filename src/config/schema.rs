//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the multi-listener binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MultiListenerConfig {
    /// Addresses to bind, grouped by network (`tcp`, `tcp4`, `tcp6`, `unix`).
    pub listeners: BTreeMap<String, Vec<String>>,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for MultiListenerConfig {
    fn default() -> Self {
        Self {
            listeners: BTreeMap::from([("tcp".to_string(), vec!["127.0.0.1:8080".to_string()])]),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "multi_listener=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: MultiListenerConfig = toml::from_str(
            r#"
            [listeners]
            tcp = ["127.0.0.1:8080"]
            tcp6 = ["[::1]:8080", "[::1]:8081"]

            [logging]
            filter = "multi_listener=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.listeners.len(), 2);
        assert_eq!(config.listeners["tcp6"].len(), 2);
        assert_eq!(config.logging.filter, "multi_listener=debug");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: MultiListenerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listeners["tcp"], vec!["127.0.0.1:8080".to_string()]);
        assert_eq!(config.logging.filter, "multi_listener=info");
    }
}
