//! Configuration for the BunnyCDN exporter.

use bunnycdn_api::ApiConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::metrics::DEFAULT_NAMESPACE;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// BunnyCDN API connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Scrape behavior.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Address to listen on (default: "0.0.0.0:9584").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,

    /// Metric name prefix (default: "bunnycdn").
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_listen() -> String {
    "0.0.0.0:9584".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

fn default_prefix() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
            prefix: default_prefix(),
        }
    }
}

/// What to report for a chart that has no entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingData {
    /// Report the value `-1`.
    #[default]
    Sentinel,
    /// Leave the series out of the scrape.
    Omit,
}

/// Scrape behavior configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Handling of empty charts: "sentinel" or "omit".
    #[serde(default)]
    pub missing_data: MissingData,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "API timeout must be > 0".to_string(),
            ));
        }

        if !self.api.has_valid_uri() {
            return Err(ConfigError::Validation(format!(
                "Invalid API URI: {}",
                self.api.uri
            )));
        }

        if self
            .prometheus
            .listen
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.prometheus.listen
            )));
        }

        if !self.prometheus.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        if matches!(self.prometheus.path.as_str(), "/" | "/health") {
            return Err(ConfigError::Validation(format!(
                "Metrics path {} is reserved",
                self.prometheus.path
            )));
        }

        if self.prometheus.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "Metric prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_minimal_config() {
        let json = "{}";
        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.api.uri, "https://bunnycdn.com/api");
        assert!(config.api.ssl_verify);
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.prometheus.listen, "0.0.0.0:9584");
        assert_eq!(config.prometheus.path, "/metrics");
        assert_eq!(config.prometheus.prefix, "bunnycdn");
        assert_eq!(config.scrape.missing_data, MissingData::Sentinel);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            api: {
                uri: "https://api.bunny.net",
                api_key: "0000-1111",
                ssl_verify: false,
                timeout: "2500ms",
            },
            prometheus: {
                listen: "127.0.0.1:9100",
                path: "/bunny/metrics",
                prefix: "cdn",
            },
            scrape: {
                missing_data: "omit",
            },
            logging: {
                level: "debug",
                format: "json"
            }
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.api.uri, "https://api.bunny.net");
        assert_eq!(config.api.api_key, "0000-1111");
        assert!(!config.api.ssl_verify);
        assert_eq!(config.api.timeout, Duration::from_millis(2500));
        assert_eq!(config.prometheus.listen, "127.0.0.1:9100");
        assert_eq!(config.prometheus.path, "/bunny/metrics");
        assert_eq!(config.prometheus.prefix, "cdn");
        assert_eq!(config.scrape.missing_data, MissingData::Omit);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_invalid_listen() {
        let json = r#"{
            prometheus: { listen: "not-an-address" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_path() {
        let json = r#"{
            prometheus: { path: "no-leading-slash" }
        }"#;

        let result = ExporterConfig::parse(json);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must start with /")
        );
    }

    #[test]
    fn test_validate_reserved_path() {
        for path in ["/", "/health"] {
            let config = ExporterConfig {
                prometheus: PrometheusConfig {
                    path: path.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(config.validate().is_err(), "path {} should be rejected", path);
        }
    }

    #[test]
    fn test_validate_zero_timeout() {
        let json = r#"{
            api: { timeout: "0s" }
        }"#;

        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_validate_invalid_uri() {
        for uri in ["bunnycdn.com/api", "ftp://bunnycdn.com/api", ""] {
            let config = ExporterConfig {
                api: ApiConfig {
                    uri: uri.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "uri {:?} should be rejected",
                uri
            );
        }
    }

    #[test]
    fn test_validate_empty_prefix() {
        let json = r#"{
            prometheus: { prefix: "" }
        }"#;

        assert!(ExporterConfig::parse(json).is_err());
    }

    #[test]
    fn test_unknown_missing_data_policy() {
        let json = r#"{
            scrape: { missing_data: "zero" }
        }"#;

        assert!(matches!(
            ExporterConfig::parse(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exporter.json5");
        std::fs::write(&path, "{ prometheus: { listen: '127.0.0.1:9999' } }").unwrap();

        let config = ExporterConfig::load_from_file(&path).unwrap();
        assert_eq!(config.prometheus.listen, "127.0.0.1:9999");

        let missing = ExporterConfig::load_from_file(dir.path().join("missing.json5"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
